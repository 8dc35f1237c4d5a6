//! Session Module
//!
//! Owns the display connection and turns it into a window manager session:
//! substructure redirection on the root, the optional diagnostic window, and
//! the sync barrier before any event is read.

use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::{ProtocolErrorKind, WmError};
use crate::transport::{Request, ScreenInfo, Transport, WindowHandle};

/// Connection plus default-screen parameters.
pub struct Session<T: Transport> {
    transport: T,
    screen: ScreenInfo,
    redirected: bool,
    diagnostic_window: Option<WindowHandle>,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T) -> Self {
        let screen = transport.screen();
        Self {
            transport,
            screen,
            redirected: false,
            diagnostic_window: None,
        }
    }

    pub fn root(&self) -> WindowHandle {
        self.screen.root
    }

    pub fn diagnostic_window(&self) -> Option<WindowHandle> {
        self.diagnostic_window
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Become the window manager for this screen.
    ///
    /// Errors here are fatal: without redirection every map and configure
    /// request would be granted by the server behind our back.
    pub fn initialize(&mut self, config: &SessionConfig) -> Result<(), WmError> {
        let root = self.root();

        if self.redirected {
            return Err(WmError::RedirectionConflict { root });
        }

        self.transport
            .request_sync(&Request::SelectSubstructureRedirect { window: root })
            .map_err(|source| {
                if source.kind() == Some(ProtocolErrorKind::Access) {
                    WmError::RedirectionConflict { root }
                } else {
                    WmError::Redirection { root, source }
                }
            })?;
        self.redirected = true;
        info!("Registered as window manager on root {}", root);

        if config.diagnostic_window {
            self.create_diagnostic_window(config.diagnostic_window_size);
        }

        // Redirection must be live before the first event is read.
        self.transport.sync()?;
        debug!("Bootstrap synced with X server");

        Ok(())
    }

    fn create_diagnostic_window(&mut self, (width, height): (u16, u16)) {
        let window = match self.transport.generate_id() {
            Ok(window) => window,
            Err(e) => {
                warn!("Skipping diagnostic window: {}", e);
                return;
            }
        };

        // Unchecked: a failure arrives later as an error event.
        self.transport.request_async(&Request::CreateWindow {
            window,
            parent: self.screen.root,
            x: 0,
            y: 0,
            width,
            height,
            depth: self.screen.root_depth,
            visual: self.screen.root_visual,
        });
        self.diagnostic_window = Some(window);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RequestError;
    use crate::transport::fake::{FakeTransport, ROOT, Sent};

    fn config() -> SessionConfig {
        SessionConfig::default()
    }

    #[test]
    fn test_initialize_installs_one_redirection() {
        let mut session = Session::new(FakeTransport::new());
        session.initialize(&config()).unwrap();

        let redirects = session
            .transport()
            .requests()
            .into_iter()
            .filter(|r| matches!(r, Request::SelectSubstructureRedirect { .. }))
            .count();
        assert_eq!(redirects, 1);
        assert_eq!(
            session.transport().sent[0],
            Sent::Checked(Request::SelectSubstructureRedirect { window: ROOT })
        );
    }

    #[test]
    fn test_second_initialize_conflicts() {
        let mut session = Session::new(FakeTransport::new());
        session.initialize(&config()).unwrap();
        let sent_before = session.transport().sent.len();

        let err = session.initialize(&config()).unwrap_err();

        assert!(matches!(err, WmError::RedirectionConflict { root } if root == ROOT));
        assert_eq!(session.transport().sent.len(), sent_before);
    }

    #[test]
    fn test_access_denied_is_conflict() {
        let transport = FakeTransport::new().fail(ROOT, ProtocolErrorKind::Access);
        let mut session = Session::new(transport);

        let err = session.initialize(&config()).unwrap_err();

        assert!(matches!(err, WmError::RedirectionConflict { .. }));
        // Nothing after the failed redirect, not even the sync barrier.
        assert_eq!(session.transport().sent.len(), 1);
    }

    #[test]
    fn test_other_redirect_error_is_fatal_but_distinct() {
        let transport = FakeTransport::new().fail(ROOT, ProtocolErrorKind::Window);
        let mut session = Session::new(transport);

        let err = session.initialize(&config()).unwrap_err();

        assert!(matches!(
            err,
            WmError::Redirection {
                source: RequestError::Protocol {
                    kind: ProtocolErrorKind::Window,
                    ..
                },
                ..
            }
        ));
    }

    #[test]
    fn test_sync_is_last() {
        let mut session = Session::new(FakeTransport::new());
        session.initialize(&config()).unwrap();

        let sent = &session.transport().sent;
        assert_eq!(sent.last(), Some(&Sent::Sync));
    }

    #[test]
    fn test_diagnostic_window_is_unchecked_child_of_root() {
        let mut session = Session::new(FakeTransport::new());
        session.initialize(&config()).unwrap();

        let window = session.diagnostic_window().unwrap();
        assert_eq!(
            session.transport().sent[1],
            Sent::Unchecked(Request::CreateWindow {
                window,
                parent: ROOT,
                x: 0,
                y: 0,
                width: 500,
                height: 500,
                depth: 24,
                visual: 0x21,
            })
        );
    }

    #[test]
    fn test_id_exhaustion_skips_diagnostic_window() {
        let mut transport = FakeTransport::new();
        transport.ids_exhausted = true;
        let mut session = Session::new(transport);

        session.initialize(&config()).unwrap();

        assert_eq!(session.diagnostic_window(), None);
        assert_eq!(
            session.transport().sent,
            vec![
                Sent::Checked(Request::SelectSubstructureRedirect { window: ROOT }),
                Sent::Sync,
            ]
        );
    }

    #[test]
    fn test_diagnostic_window_can_be_disabled() {
        let mut session = Session::new(FakeTransport::new());
        let config = SessionConfig {
            diagnostic_window: false,
            ..SessionConfig::default()
        };

        session.initialize(&config).unwrap();

        assert_eq!(session.transport().sent.len(), 2);
        assert_eq!(session.diagnostic_window(), None);
    }
}
