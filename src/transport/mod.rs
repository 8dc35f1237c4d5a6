//! Protocol Transport
//!
//! The seam between the window manager core and the display server
//! connection. Checked and unchecked requests are two separate calls:
//! [`Transport::request_sync`] blocks for the server's verdict, while
//! [`Transport::request_async`] returns immediately and any error shows up
//! later in the event stream.

pub mod x11;

#[cfg(test)]
pub mod fake;

use std::fmt;

use crate::error::{RequestError, WmError};
use crate::wm::events::WmEvent;

pub use self::x11::X11Transport;

/// Server-assigned window identifier. Compared by value, never dereferenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowHandle(pub u32);

impl WindowHandle {
    /// The protocol's "no window" value.
    pub const NONE: WindowHandle = WindowHandle(0);
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Relative stacking directive for a configure request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackMode {
    Above,
    Below,
    TopIf,
    BottomIf,
    Opposite,
}

/// Protocol value-mask bits for ConfigureWindow.
pub mod config_mask {
    pub const X: u16 = 1 << 0;
    pub const Y: u16 = 1 << 1;
    pub const WIDTH: u16 = 1 << 2;
    pub const HEIGHT: u16 = 1 << 3;
    pub const BORDER_WIDTH: u16 = 1 << 4;
    pub const SIBLING: u16 = 1 << 5;
    pub const STACK_MODE: u16 = 1 << 6;
}

/// Fields of a ConfigureWindow request. `None` means "leave untouched".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowChanges {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub border_width: Option<u32>,
    pub sibling: Option<WindowHandle>,
    pub stack_mode: Option<StackMode>,
}

impl WindowChanges {
    pub fn raise() -> Self {
        Self {
            stack_mode: Some(StackMode::Above),
            ..Self::default()
        }
    }

    /// Bitmask of the fields present in this set.
    pub fn value_mask(&self) -> u16 {
        let mut mask = 0;
        if self.x.is_some() {
            mask |= config_mask::X;
        }
        if self.y.is_some() {
            mask |= config_mask::Y;
        }
        if self.width.is_some() {
            mask |= config_mask::WIDTH;
        }
        if self.height.is_some() {
            mask |= config_mask::HEIGHT;
        }
        if self.border_width.is_some() {
            mask |= config_mask::BORDER_WIDTH;
        }
        if self.sibling.is_some() {
            mask |= config_mask::SIBLING;
        }
        if self.stack_mode.is_some() {
            mask |= config_mask::STACK_MODE;
        }
        mask
    }
}

/// Requests the core issues. Each maps to one protocol request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// ChangeWindowAttributes with the SubstructureRedirect event mask.
    SelectSubstructureRedirect { window: WindowHandle },
    ConfigureWindow {
        window: WindowHandle,
        changes: WindowChanges,
    },
    MapWindow { window: WindowHandle },
    /// InputOutput window with no attributes.
    CreateWindow {
        window: WindowHandle,
        parent: WindowHandle,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
        depth: u8,
        visual: u32,
    },
}

impl Request {
    /// Window the request targets.
    pub fn window(&self) -> WindowHandle {
        match self {
            Self::SelectSubstructureRedirect { window }
            | Self::ConfigureWindow { window, .. }
            | Self::MapWindow { window }
            | Self::CreateWindow { window, .. } => *window,
        }
    }
}

/// Default screen parameters taken from the setup reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenInfo {
    pub screen_num: usize,
    pub root: WindowHandle,
    pub width: u16,
    pub height: u16,
    pub root_depth: u8,
    pub root_visual: u32,
}

/// Connection to the display server.
///
/// Only the dispatch context holds a `Transport`; request ordering on the
/// wire is whatever order these methods are called in.
pub trait Transport {
    /// Default screen resolved when the connection was established.
    fn screen(&self) -> ScreenInfo;

    /// Allocate an identifier for a window the manager creates itself.
    fn generate_id(&mut self) -> Result<WindowHandle, WmError>;

    /// Send a checked request and block for its acknowledgment.
    fn request_sync(&mut self, request: &Request) -> Result<(), RequestError>;

    /// Send an unchecked request. Errors arrive later as [`WmEvent::Error`].
    fn request_async(&mut self, request: &Request);

    /// Flush and round-trip so every earlier request has been processed.
    fn sync(&mut self) -> Result<(), WmError>;

    /// Block for the next event. `Ok(None)` means the stream ended.
    fn wait_for_event(&mut self) -> Result<Option<WmEvent>, WmError>;
}
