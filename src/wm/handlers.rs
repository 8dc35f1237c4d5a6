//! Request handlers for MapRequest and ConfigureRequest.
//!
//! Both grant the client's wish as-is. Every request is checked, and a
//! rejection is logged and reported as [`EventResult::Degraded`] instead of
//! being propagated: a window destroyed between its request and our reply is
//! an ordinary race.

use tracing::{debug, warn};

use crate::transport::{Request, Transport, WindowChanges, WindowHandle};
use crate::wm::events::{ConfigureRequest, EventResult};
use crate::wm::registry::WindowRegistry;
use crate::wm::session::Session;

/// Raise the window to the top of the stack, then map it.
pub fn on_map_request<T: Transport>(
    session: &mut Session<T>,
    registry: &mut WindowRegistry,
    window: WindowHandle,
) -> EventResult {
    let raise = WindowChanges::raise();
    let transport = session.transport_mut();

    let raised = transport
        .request_sync(&Request::ConfigureWindow {
            window,
            changes: raise,
        })
        .map_err(|e| warn!("Unable to raise window {}: {}", window, e))
        .is_ok();

    if let Err(e) = transport.request_sync(&Request::MapWindow { window }) {
        warn!("Unable to map window {}: {}", window, e);
        return EventResult::Degraded;
    }

    let first_sighting = registry.get(window).is_none();
    let entry = registry.observe(window);
    if raised {
        entry.apply(&raise);
    }
    debug!("Mapped window {} (new: {})", window, first_sighting);

    if raised {
        EventResult::Handled
    } else {
        EventResult::Degraded
    }
}

/// Forward the requested fields unmodified.
pub fn on_configure_request<T: Transport>(
    session: &mut Session<T>,
    registry: &mut WindowRegistry,
    request: &ConfigureRequest,
) -> EventResult {
    let ConfigureRequest {
        window, changes, ..
    } = *request;

    if let Err(e) = session
        .transport_mut()
        .request_sync(&Request::ConfigureWindow { window, changes })
    {
        warn!("Unable to configure window {}: {}", window, e);
        return EventResult::Degraded;
    }

    let entry = registry.record(window, &changes);
    debug!("Configured window {}: {:?}", window, entry);
    EventResult::Handled
}
