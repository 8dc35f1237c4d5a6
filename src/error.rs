//! Error types for plinth.
//!
//! Two layers: [`WmError`] for failures that end the session, and
//! [`RequestError`] for a single checked request that the server rejected.

use std::fmt;

use thiserror::Error;
use x11rb::errors::{ConnectError, ConnectionError};

use crate::transport::WindowHandle;

/// Fatal session error.
#[derive(Debug, Error)]
pub enum WmError {
    /// Could not open a connection to the display server.
    #[error("failed to connect to display server: {0}")]
    Connect(#[from] ConnectError),

    /// The setup reply did not describe a usable default screen.
    #[error("malformed setup reply: {0}")]
    Setup(String),

    /// Someone else already selected SubstructureRedirect on the root.
    #[error("another window manager is already running on root {root}")]
    RedirectionConflict { root: WindowHandle },

    /// The redirect request failed for a reason other than a conflict.
    #[error("failed to redirect substructure of root {root}: {source}")]
    Redirection {
        root: WindowHandle,
        #[source]
        source: RequestError,
    },

    /// Resource identifier allocation failed.
    #[error("resource id allocation failed: {0}")]
    IdAllocation(String),

    /// The connection broke underneath us.
    #[error("transport error: {0}")]
    Transport(#[from] ConnectionError),

    /// The ordering barrier after bootstrap did not complete.
    #[error("sync with display server failed: {0}")]
    Sync(String),
}

/// Failure of one checked request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The server answered with a protocol error.
    #[error("{kind} error (bad value {bad_value:#x}, major opcode {major_opcode})")]
    Protocol {
        kind: ProtocolErrorKind,
        bad_value: u32,
        major_opcode: u8,
    },

    /// The request never got an answer because the connection failed.
    #[error("connection failed: {0}")]
    Connection(String),
}

impl RequestError {
    /// Shorthand used for server-side rejections.
    pub fn protocol(kind: ProtocolErrorKind, bad_value: u32, major_opcode: u8) -> Self {
        Self::Protocol {
            kind,
            bad_value,
            major_opcode,
        }
    }

    pub fn kind(&self) -> Option<ProtocolErrorKind> {
        match self {
            Self::Protocol { kind, .. } => Some(*kind),
            Self::Connection(_) => None,
        }
    }
}

/// The protocol error classes this core distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolErrorKind {
    Window,
    Access,
    Match,
    Value,
    Other(u8),
}

impl fmt::Display for ProtocolErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Window => f.write_str("BadWindow"),
            Self::Access => f.write_str("BadAccess"),
            Self::Match => f.write_str("BadMatch"),
            Self::Value => f.write_str("BadValue"),
            Self::Other(code) => write!(f, "error code {code}"),
        }
    }
}
