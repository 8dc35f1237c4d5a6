//! Scripted in-memory transport for tests.

use std::collections::{HashMap, VecDeque};

use x11rb::errors::ConnectionError;

use crate::error::{ProtocolErrorKind, RequestError, WmError};
use crate::transport::{Request, ScreenInfo, Transport, WindowHandle};
use crate::wm::events::WmEvent;

pub const ROOT: WindowHandle = WindowHandle(0x1e3);

/// What went over the fake wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Checked(Request),
    Unchecked(Request),
    Sync,
}

#[derive(Debug)]
pub struct FakeTransport {
    pub screen: ScreenInfo,
    pub sent: Vec<Sent>,
    pub events: VecDeque<Result<Option<WmEvent>, WmError>>,
    /// Windows whose checked requests the "server" rejects.
    pub failing: HashMap<WindowHandle, ProtocolErrorKind>,
    /// Which requests to failing windows get rejected.
    pub fail_filter: fn(&Request) -> bool,
    pub ids_exhausted: bool,
    next_id: u32,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self {
            screen: ScreenInfo {
                screen_num: 0,
                root: ROOT,
                width: 1920,
                height: 1080,
                root_depth: 24,
                root_visual: 0x21,
            },
            sent: Vec::new(),
            events: VecDeque::new(),
            failing: HashMap::new(),
            fail_filter: |_| true,
            ids_exhausted: false,
            next_id: 0x0040_0000,
        }
    }

    pub fn fail(mut self, window: WindowHandle, kind: ProtocolErrorKind) -> Self {
        self.failing.insert(window, kind);
        self
    }

    pub fn push_event(&mut self, event: WmEvent) {
        self.events.push_back(Ok(Some(event)));
    }

    pub fn push_transport_error(&mut self) {
        self.events
            .push_back(Err(WmError::Transport(ConnectionError::UnknownError)));
    }

    /// Requests sent, checked or not, in wire order.
    pub fn requests(&self) -> Vec<Request> {
        self.sent
            .iter()
            .filter_map(|s| match s {
                Sent::Checked(r) | Sent::Unchecked(r) => Some(r.clone()),
                Sent::Sync => None,
            })
            .collect()
    }
}

fn major_opcode(request: &Request) -> u8 {
    match request {
        Request::CreateWindow { .. } => 1,
        Request::SelectSubstructureRedirect { .. } => 2,
        Request::MapWindow { .. } => 8,
        Request::ConfigureWindow { .. } => 12,
    }
}

impl Transport for FakeTransport {
    fn screen(&self) -> ScreenInfo {
        self.screen
    }

    fn generate_id(&mut self) -> Result<WindowHandle, WmError> {
        if self.ids_exhausted {
            return Err(WmError::IdAllocation("X11 IDs have been exhausted".into()));
        }
        self.next_id += 1;
        Ok(WindowHandle(self.next_id))
    }

    fn request_sync(&mut self, request: &Request) -> Result<(), RequestError> {
        self.sent.push(Sent::Checked(request.clone()));

        match self.failing.get(&request.window()) {
            Some(kind) if (self.fail_filter)(request) => Err(RequestError::protocol(
                *kind,
                request.window().0,
                major_opcode(request),
            )),
            _ => Ok(()),
        }
    }

    fn request_async(&mut self, request: &Request) {
        self.sent.push(Sent::Unchecked(request.clone()));
    }

    fn sync(&mut self) -> Result<(), WmError> {
        self.sent.push(Sent::Sync);
        Ok(())
    }

    fn wait_for_event(&mut self) -> Result<Option<WmEvent>, WmError> {
        // An exhausted script behaves like the server hanging up.
        self.events.pop_front().unwrap_or(Ok(None))
    }
}
