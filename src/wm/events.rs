//! Events Module
//!
//! Decoded events the dispatcher understands, and the result of handling one.

use crate::error::RequestError;
use crate::transport::{WindowChanges, WindowHandle};

/// A client's request to change geometry or stacking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigureRequest {
    pub window: WindowHandle,
    pub parent: WindowHandle,
    /// Only the fields the client put in its value mask.
    pub changes: WindowChanges,
}

/// Event kinds the dispatcher routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WmEvent {
    MapRequest {
        window: WindowHandle,
        parent: WindowHandle,
    },
    ConfigureRequest(ConfigureRequest),
    Expose {
        window: WindowHandle,
        count: u16,
    },
    /// Error for an earlier unchecked request, delivered in-band.
    Error { sequence: u16, error: RequestError },
    /// Anything else the server sends, extension events included.
    Unknown,
}

impl WmEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MapRequest { .. } => "MapRequest",
            Self::ConfigureRequest(_) => "ConfigureRequest",
            Self::Expose { .. } => "Expose",
            Self::Error { .. } => "Error",
            Self::Unknown => "Unknown",
        }
    }
}

/// Result of event handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Every request the handler issued was accepted
    Handled,
    /// At least one request failed; the failure was logged
    Degraded,
    /// Nothing to do for this event
    Ignored,
}
