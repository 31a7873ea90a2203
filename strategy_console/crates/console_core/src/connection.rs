use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

const TRANSITION_BACKLOG: usize = 16;

/// Lifecycle of the engine connection, mirroring a WebSocket `readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closing,
    Closed,
}

impl ConnectionState {
    fn as_u8(self) -> u8 {
        match self {
            ConnectionState::Connecting => 0,
            ConnectionState::Open => 1,
            ConnectionState::Closing => 2,
            ConnectionState::Closed => 3,
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => ConnectionState::Connecting,
            1 => ConnectionState::Open,
            2 => ConnectionState::Closing,
            _ => ConnectionState::Closed,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closing => "closing",
            ConnectionState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Read-only view of the connection lifecycle.
pub trait ConnectionStateSource: Send + Sync {
    fn current(&self) -> ConnectionState;
}

/// A fixed state. Handy for callers that already know the answer.
impl ConnectionStateSource for ConnectionState {
    fn current(&self) -> ConnectionState {
        *self
    }
}

/// The one shared state cell per connection.
///
/// Only the connection manager writes it; everything else goes through
/// [`ConnectionStateSource::current`] or follows transitions via
/// [`SharedConnectionState::subscribe`].
#[derive(Debug, Clone)]
pub struct SharedConnectionState {
    cell: Arc<AtomicU8>,
    transitions: broadcast::Sender<ConnectionState>,
}

impl SharedConnectionState {
    pub fn new() -> Self {
        let (transitions, _) = broadcast::channel(TRANSITION_BACKLOG);
        Self {
            cell: Arc::new(AtomicU8::new(ConnectionState::Closed.as_u8())),
            transitions,
        }
    }

    pub fn set(&self, state: ConnectionState) {
        let prev = self.cell.swap(state.as_u8(), Ordering::SeqCst);
        if prev != state.as_u8() {
            // No subscribers is fine.
            let _ = self.transitions.send(state);
        }
    }

    /// Every change made after this call, in order.
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectionState> {
        self.transitions.subscribe()
    }
}

impl Default for SharedConnectionState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionStateSource for SharedConnectionState {
    fn current(&self) -> ConnectionState {
        ConnectionState::from_u8(self.cell.load(Ordering::SeqCst))
    }
}
