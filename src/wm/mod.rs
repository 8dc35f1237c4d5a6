//! Window Manager Module
//!
//! The event dispatcher: one blocking receive per iteration, one handler per
//! recognized event, until the server hangs up or the connection breaks.

pub mod events;
pub mod handlers;
pub mod registry;
pub mod session;

use tracing::{debug, info, trace, warn};

use crate::error::WmError;
use crate::transport::Transport;
use crate::wm::events::{EventResult, WmEvent};
use crate::wm::registry::WindowRegistry;
use crate::wm::session::Session;

/// Counters kept over one dispatch loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchStats {
    pub events: u64,
    pub degraded: u64,
    pub ignored: u64,
    pub async_errors: u64,
}

impl DispatchStats {
    fn count(&mut self, result: EventResult) {
        self.events += 1;
        match result {
            EventResult::Handled => {}
            EventResult::Degraded => self.degraded += 1,
            EventResult::Ignored => self.ignored += 1,
        }
    }
}

pub struct WindowManager<T: Transport> {
    session: Session<T>,
    registry: WindowRegistry,
    stats: DispatchStats,
}

impl<T: Transport> WindowManager<T> {
    /// Wrap a session that has already been initialized.
    pub fn new(session: Session<T>) -> Self {
        Self {
            session,
            registry: WindowRegistry::new(),
            stats: DispatchStats::default(),
        }
    }

    /// Main event loop.
    ///
    /// Returns `Ok` when the event stream ends; a transport error is returned
    /// as-is and ends the session.
    pub fn run(&mut self) -> Result<DispatchStats, WmError> {
        info!("Entering event loop");

        let outcome = loop {
            match self.session.transport_mut().wait_for_event() {
                Ok(Some(event)) => {
                    trace!("Received {}", event.name());
                    let result = self.dispatch(&event);
                    self.stats.count(result);
                }
                Ok(None) => break Ok(self.stats),
                Err(e) => break Err(e),
            }
        };

        info!(
            "Event loop finished: {} events, {} degraded, {} ignored, {} async errors, {} windows known",
            self.stats.events,
            self.stats.degraded,
            self.stats.ignored,
            self.stats.async_errors,
            self.registry.len()
        );
        outcome
    }

    /// Route one event to its handler.
    pub fn dispatch(&mut self, event: &WmEvent) -> EventResult {
        match event {
            WmEvent::MapRequest { window, parent } => {
                debug!("MapRequest for window {} (parent {})", window, parent);
                handlers::on_map_request(&mut self.session, &mut self.registry, *window)
            }
            WmEvent::ConfigureRequest(request) => {
                debug!(
                    "ConfigureRequest for window {} (mask {:#x})",
                    request.window,
                    request.changes.value_mask()
                );
                handlers::on_configure_request(&mut self.session, &mut self.registry, request)
            }
            WmEvent::Expose { window, count } => {
                debug!("Expose for window {} ({} more)", window, count);
                EventResult::Ignored
            }
            WmEvent::Error { sequence, error } => {
                self.stats.async_errors += 1;
                warn!("X11 error for request #{}: {}", sequence, error);
                EventResult::Ignored
            }
            WmEvent::Unknown => EventResult::Ignored,
        }
    }

    #[cfg(test)]
    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    #[cfg(test)]
    pub fn session(&self) -> &Session<T> {
        &self.session
    }
}
