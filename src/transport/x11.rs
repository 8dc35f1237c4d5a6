//! x11rb-backed transport.

use std::io::ErrorKind as IoErrorKind;

use tracing::{debug, info, trace, warn};
use x11rb::connection::Connection;
use x11rb::cookie::VoidCookie;
use x11rb::errors::{ConnectionError, ReplyError};
use x11rb::protocol::xproto::{
    self, ChangeWindowAttributesAux, ConfigWindow, ConfigureRequestEvent, ConfigureWindowAux,
    ConnectionExt as _, CreateWindowAux, EventMask, Screen, WindowClass,
};
use x11rb::protocol::{ErrorKind, Event};
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;
use x11rb::x11_utils::X11Error;

use crate::error::{ProtocolErrorKind, RequestError, WmError};
use crate::transport::{
    Request, ScreenInfo, StackMode, Transport, WindowChanges, WindowHandle,
};
use crate::wm::events::{ConfigureRequest, WmEvent};

/// Transport over a `RustConnection`.
pub struct X11Transport {
    conn: RustConnection,
    screen: ScreenInfo,
}

impl X11Transport {
    /// Connect to the display named by `display` (or `$DISPLAY`) and resolve
    /// its default screen.
    pub fn connect(display: Option<&str>) -> Result<Self, WmError> {
        let (conn, screen_num) = x11rb::connect(display)?;
        let screen = resolve_screen(&conn.setup().roots, screen_num)?;

        info!(
            "Connected to X server, screen {}, root window {}",
            screen.screen_num, screen.root
        );
        info!("Screen size: {}x{}", screen.width, screen.height);

        Ok(Self { conn, screen })
    }

    fn send(&self, request: &Request) -> Result<VoidCookie<'_, RustConnection>, ConnectionError> {
        match *request {
            Request::SelectSubstructureRedirect { window } => self.conn.change_window_attributes(
                window.0,
                &ChangeWindowAttributesAux::new().event_mask(EventMask::SUBSTRUCTURE_REDIRECT),
            ),
            Request::ConfigureWindow { window, changes } => {
                self.conn.configure_window(window.0, &configure_aux(&changes))
            }
            Request::MapWindow { window } => self.conn.map_window(window.0),
            Request::CreateWindow {
                window,
                parent,
                x,
                y,
                width,
                height,
                depth,
                visual,
            } => self.conn.create_window(
                depth,
                window.0,
                parent.0,
                x,
                y,
                width,
                height,
                0,
                WindowClass::INPUT_OUTPUT,
                visual,
                &CreateWindowAux::new(),
            ),
        }
    }
}

impl Transport for X11Transport {
    fn screen(&self) -> ScreenInfo {
        self.screen
    }

    fn generate_id(&mut self) -> Result<WindowHandle, WmError> {
        self.conn
            .generate_id()
            .map(WindowHandle)
            .map_err(|e| WmError::IdAllocation(e.to_string()))
    }

    fn request_sync(&mut self, request: &Request) -> Result<(), RequestError> {
        let cookie = self
            .send(request)
            .map_err(|e| RequestError::Connection(e.to_string()))?;
        cookie.check().map_err(|e| match e {
            ReplyError::ConnectionError(e) => RequestError::Connection(e.to_string()),
            ReplyError::X11Error(e) => protocol_error(&e),
        })
    }

    fn request_async(&mut self, request: &Request) {
        match self.send(request) {
            // Dropping the cookie routes any error into the event queue.
            Ok(cookie) => drop(cookie),
            Err(e) => warn!("Failed to send request for window {}: {}", request.window(), e),
        }
    }

    fn sync(&mut self) -> Result<(), WmError> {
        self.conn.sync().map_err(|e| match e {
            ReplyError::ConnectionError(e) => WmError::Transport(e),
            ReplyError::X11Error(e) => WmError::Sync(protocol_error(&e).to_string()),
        })
    }

    fn wait_for_event(&mut self) -> Result<Option<WmEvent>, WmError> {
        let received = self.conn.flush().and_then(|()| self.conn.wait_for_event());
        match received {
            Ok(event) => Ok(Some(decode_event(event))),
            Err(e) if is_end_of_stream(&e) => {
                info!("X server closed the connection");
                Ok(None)
            }
            Err(e) => Err(WmError::Transport(e)),
        }
    }
}

/// Pick the default screen out of the setup reply.
pub fn resolve_screen(roots: &[Screen], screen_num: usize) -> Result<ScreenInfo, WmError> {
    let screen = roots.get(screen_num).ok_or_else(|| {
        WmError::Setup(format!(
            "default screen {} missing, setup lists {} screen(s)",
            screen_num,
            roots.len()
        ))
    })?;

    if WindowHandle(screen.root) == WindowHandle::NONE {
        return Err(WmError::Setup(format!(
            "screen {} has no root window",
            screen_num
        )));
    }

    Ok(ScreenInfo {
        screen_num,
        root: WindowHandle(screen.root),
        width: screen.width_in_pixels,
        height: screen.height_in_pixels,
        root_depth: screen.root_depth,
        root_visual: screen.root_visual,
    })
}

fn is_end_of_stream(err: &ConnectionError) -> bool {
    matches!(err, ConnectionError::IoError(e) if e.kind() == IoErrorKind::UnexpectedEof)
}

fn protocol_error(err: &X11Error) -> RequestError {
    let kind = match err.error_kind {
        ErrorKind::Window => ProtocolErrorKind::Window,
        ErrorKind::Access => ProtocolErrorKind::Access,
        ErrorKind::Match => ProtocolErrorKind::Match,
        ErrorKind::Value => ProtocolErrorKind::Value,
        _ => ProtocolErrorKind::Other(err.error_code),
    };
    RequestError::protocol(kind, err.bad_value, err.major_opcode)
}

fn configure_aux(changes: &WindowChanges) -> ConfigureWindowAux {
    ConfigureWindowAux::new()
        .x(changes.x)
        .y(changes.y)
        .width(changes.width)
        .height(changes.height)
        .border_width(changes.border_width)
        .sibling(changes.sibling.map(|w| w.0))
        .stack_mode(changes.stack_mode.map(to_x_stack_mode))
}

fn to_x_stack_mode(mode: StackMode) -> xproto::StackMode {
    match mode {
        StackMode::Above => xproto::StackMode::ABOVE,
        StackMode::Below => xproto::StackMode::BELOW,
        StackMode::TopIf => xproto::StackMode::TOP_IF,
        StackMode::BottomIf => xproto::StackMode::BOTTOM_IF,
        StackMode::Opposite => xproto::StackMode::OPPOSITE,
    }
}

fn from_x_stack_mode(mode: xproto::StackMode) -> StackMode {
    if mode == xproto::StackMode::BELOW {
        StackMode::Below
    } else if mode == xproto::StackMode::TOP_IF {
        StackMode::TopIf
    } else if mode == xproto::StackMode::BOTTOM_IF {
        StackMode::BottomIf
    } else if mode == xproto::StackMode::OPPOSITE {
        StackMode::Opposite
    } else {
        StackMode::Above
    }
}

/// Keep only the fields the client put in the value mask.
fn changes_from_request(e: &ConfigureRequestEvent) -> WindowChanges {
    let mask = u16::from(e.value_mask);
    let has = |flag: ConfigWindow| mask & u16::from(flag) != 0;

    WindowChanges {
        x: has(ConfigWindow::X).then_some(i32::from(e.x)),
        y: has(ConfigWindow::Y).then_some(i32::from(e.y)),
        width: has(ConfigWindow::WIDTH).then_some(u32::from(e.width)),
        height: has(ConfigWindow::HEIGHT).then_some(u32::from(e.height)),
        border_width: has(ConfigWindow::BORDER_WIDTH).then_some(u32::from(e.border_width)),
        sibling: has(ConfigWindow::SIBLING).then_some(WindowHandle(e.sibling)),
        stack_mode: has(ConfigWindow::STACK_MODE).then(|| from_x_stack_mode(e.stack_mode)),
    }
}

fn decode_event(event: Event) -> WmEvent {
    match event {
        Event::MapRequest(e) => WmEvent::MapRequest {
            window: WindowHandle(e.window),
            parent: WindowHandle(e.parent),
        },
        Event::ConfigureRequest(e) => WmEvent::ConfigureRequest(ConfigureRequest {
            window: WindowHandle(e.window),
            parent: WindowHandle(e.parent),
            changes: changes_from_request(&e),
        }),
        Event::Expose(e) => WmEvent::Expose {
            window: WindowHandle(e.window),
            count: e.count,
        },
        Event::Error(e) => {
            debug!(
                "Async X11 error: {:?} on request {:?}",
                e.error_kind, e.request_name
            );
            WmEvent::Error {
                sequence: e.sequence,
                error: protocol_error(&e),
            }
        }
        other => {
            trace!("Undecoded event: {:?}", other);
            WmEvent::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_default_screen_is_setup_error() {
        let err = resolve_screen(&[], 0).unwrap_err();
        assert!(matches!(err, WmError::Setup(_)));
    }

    #[test]
    fn test_configure_request_honors_value_mask() {
        let event = ConfigureRequestEvent {
            window: 7,
            parent: 1,
            sibling: 99,
            x: 10,
            y: 20,
            width: 300,
            height: 200,
            border_width: 4,
            stack_mode: xproto::StackMode::BELOW,
            value_mask: ConfigWindow::X | ConfigWindow::WIDTH,
            ..Default::default()
        };

        let changes = changes_from_request(&event);
        assert_eq!(
            changes,
            WindowChanges {
                x: Some(10),
                width: Some(300),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_stack_mode_conversion_is_symmetric() {
        for mode in [
            StackMode::Above,
            StackMode::Below,
            StackMode::TopIf,
            StackMode::BottomIf,
            StackMode::Opposite,
        ] {
            assert_eq!(from_x_stack_mode(to_x_stack_mode(mode)), mode);
        }
    }
}
