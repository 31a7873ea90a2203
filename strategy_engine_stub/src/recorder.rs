use crate::protocol::{ClientCommand, InboundMsg, OutboundMsg, ServerMessage};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Engine-side loop that acknowledges and keeps every decoded command.
///
/// Nothing is executed; this only stands in for the engine at the far end of
/// the socket.
pub struct Recorder {
    inbound_rx: Receiver<InboundMsg>,
    outbound_tx: Sender<OutboundMsg>,
    received: Vec<ClientCommand>,
    client_connected: bool,
}

impl Recorder {
    pub fn new(inbound_rx: Receiver<InboundMsg>, outbound_tx: Sender<OutboundMsg>) -> Self {
        Self {
            inbound_rx,
            outbound_tx,
            received: Vec::new(),
            client_connected: false,
        }
    }

    /// Drains pending inbound messages. Returns how many commands were recorded.
    pub fn tick(&mut self) -> usize {
        let mut recorded = 0;
        loop {
            match self.inbound_rx.try_recv() {
                Ok(InboundMsg::ClientConnected { socket_addr }) => {
                    debug!(%socket_addr, "recorder saw client");
                    self.client_connected = true;
                }
                Ok(InboundMsg::ClientDisconnected) => self.client_connected = false,
                Ok(InboundMsg::Command { cmd }) => {
                    let strategy_name = cmd.strategy().strategy_name.clone();
                    info!(%strategy_name, "execute_strategy received");
                    let _ = self.outbound_tx.try_send(OutboundMsg::Send {
                        msg: ServerMessage::Accepted { strategy_name },
                    });
                    self.received.push(cmd);
                    recorded += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        recorded
    }

    /// Ticks until at least `count` commands are recorded or `timeout` passes.
    pub fn wait_for(&mut self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.tick();
            if self.received.len() >= count {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    pub fn received(&self) -> &[ClientCommand] {
        &self.received
    }

    pub fn is_client_connected(&self) -> bool {
        self.client_connected
    }
}
