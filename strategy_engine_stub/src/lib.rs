//! Stand-in for the remote strategy engine.
//!
//! A network thread owns the listening socket and a single client; the
//! [`Recorder`] runs on the caller's thread and keeps every decoded
//! `execute_strategy` command.

mod net;
mod protocol;
mod recorder;

pub use crate::net::{EngineError, NetworkThread, DEFAULT_ADDR};
pub use crate::protocol::{InboundMsg, OutboundMsg, INBOUND_CAP, OUTBOUND_CAP};
pub use crate::recorder::Recorder;

use crossbeam_channel::bounded;

/// Binds `addr` and wires a [`Recorder`] to the network thread.
pub fn spawn_engine(addr: &str) -> Result<(NetworkThread, Recorder), EngineError> {
    let (in_tx, in_rx) = bounded(INBOUND_CAP);
    let (out_tx, out_rx) = bounded(OUTBOUND_CAP);
    let net = NetworkThread::spawn_with_addr(addr, in_tx, out_rx)?;
    Ok((net, Recorder::new(in_rx, out_tx)))
}
