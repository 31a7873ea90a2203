use crate::connection::{ConnectionState, SharedConnectionState};
use crate::notification::{Notification, NotificationSink, SEND_FAILED};
use crate::transport::{ActorTransport, TransportError};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use strategy_protocol::ServerMessage;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug)]
pub enum ActorCommand {
    Connect,
    Disconnect,
    Send(String),
}

/// Handle to a running connection actor.
#[derive(Clone)]
pub struct ActorHandle {
    tx: mpsc::Sender<ActorCommand>,
    state: SharedConnectionState,
}

impl ActorHandle {
    pub fn transport(&self) -> ActorTransport {
        ActorTransport::new(self.tx.clone())
    }

    pub fn state(&self) -> SharedConnectionState {
        self.state.clone()
    }

    pub async fn connect(&self) -> Result<(), TransportError> {
        self.tx
            .send(ActorCommand::Connect)
            .await
            .map_err(|_| TransportError::ChannelClosed)
    }

    pub async fn disconnect(&self) -> Result<(), TransportError> {
        self.tx
            .send(ActorCommand::Disconnect)
            .await
            .map_err(|_| TransportError::ChannelClosed)
    }
}

/// Spawns the actor on the current tokio runtime.
pub fn spawn(
    ws_url: Url,
    outbound_capacity: usize,
    sink: Arc<dyn NotificationSink>,
    start_connected: bool,
) -> ActorHandle {
    let (tx, rx) = mpsc::channel(outbound_capacity.max(1));
    let state = SharedConnectionState::new();
    let actor_state = state.clone();
    tokio::spawn(async move {
        run(rx, ws_url, actor_state, sink, start_connected).await;
    });
    ActorHandle { tx, state }
}

/// Owns the engine socket and is the only writer of `state`.
///
/// Runs until every sender of `rx` is dropped.
pub async fn run(
    mut rx: mpsc::Receiver<ActorCommand>,
    ws_url: Url,
    state: SharedConnectionState,
    sink: Arc<dyn NotificationSink>,
    start_connected: bool,
) {
    let mut desired_connected = start_connected;
    let mut backoff = Backoff::default();

    loop {
        if !desired_connected {
            state.set(ConnectionState::Closed);
            match rx.recv().await {
                Some(ActorCommand::Connect) => desired_connected = true,
                Some(ActorCommand::Disconnect) => {}
                Some(ActorCommand::Send(_)) => reject_frame(sink.as_ref()),
                None => return,
            }
            continue;
        }

        // Frames left over from a previous connection never reach a new one.
        if !reject_stale(&mut rx, sink.as_ref(), &mut desired_connected) {
            state.set(ConnectionState::Closed);
            return;
        }
        if !desired_connected {
            continue;
        }

        state.set(ConnectionState::Connecting);
        info!(url = %ws_url, "connecting to strategy engine");
        let socket = match tokio_tungstenite::connect_async(ws_url.as_str()).await {
            Ok((mut socket, _)) => {
                // Anything queued during the handshake was sent against a closed state.
                let senders_alive = reject_stale(&mut rx, sink.as_ref(), &mut desired_connected);
                if !senders_alive || !desired_connected {
                    state.set(ConnectionState::Closing);
                    let _ = socket.close(None).await;
                    state.set(ConnectionState::Closed);
                    if !senders_alive {
                        return;
                    }
                    continue;
                }
                backoff.reset();
                state.set(ConnectionState::Open);
                info!(url = %ws_url, "connected to strategy engine");
                sink.notify(Notification::info("Connected to strategy engine"));
                socket
            }
            Err(e) => {
                state.set(ConnectionState::Closed);
                let retry = backoff.next_delay();
                warn!(url = %ws_url, "connect failed: {e}; retrying in {}s", retry.as_secs());
                sink.notify(Notification::info(format!(
                    "Strategy engine unavailable, retrying in {}s",
                    retry.as_secs()
                )));

                let sleep = tokio::time::sleep(retry);
                tokio::pin!(sleep);
                loop {
                    tokio::select! {
                        _ = &mut sleep => break,
                        cmd = rx.recv() => match cmd {
                            Some(ActorCommand::Connect) => {}
                            Some(ActorCommand::Disconnect) => { desired_connected = false; break; }
                            Some(ActorCommand::Send(_)) => reject_frame(sink.as_ref()),
                            None => return,
                        }
                    }
                }
                continue;
            }
        };

        let (mut write, mut read) = socket.split();

        'conn: loop {
            tokio::select! {
                cmd = rx.recv() => {
                    match cmd {
                        Some(ActorCommand::Connect) => {}
                        Some(ActorCommand::Disconnect) => {
                            desired_connected = false;
                            state.set(ConnectionState::Closing);
                            let _ = write.close().await;
                            break 'conn;
                        }
                        Some(ActorCommand::Send(frame)) => {
                            if let Err(e) = write.send(Message::Text(frame.into())).await {
                                warn!("socket write failed: {e}");
                                sink.notify(Notification::error(SEND_FAILED));
                                break 'conn;
                            }
                        }
                        None => {
                            state.set(ConnectionState::Closing);
                            let _ = write.close().await;
                            state.set(ConnectionState::Closed);
                            return;
                        }
                    }
                }
                incoming = read.next() => {
                    match incoming {
                        Some(Ok(msg)) => {
                            if msg.is_close() {
                                info!("strategy engine closed the connection");
                                break 'conn;
                            }
                            if !msg.is_text() {
                                continue;
                            }
                            let Ok(text) = msg.into_text() else { continue };
                            handle_engine_message(&text, sink.as_ref());
                        }
                        Some(Err(e)) => {
                            warn!("engine connection read failed: {e}");
                            break 'conn;
                        }
                        None => break 'conn,
                    }
                }
            }
        }

        state.set(ConnectionState::Closed);
        if !reject_stale(&mut rx, sink.as_ref(), &mut desired_connected) {
            return;
        }
        if desired_connected {
            sink.notify(Notification::info("Connection to strategy engine closed"));
        }
    }
}

/// A frame reached the actor after the socket went away.
fn reject_frame(sink: &dyn NotificationSink) {
    warn!("dropping outbound frame: no open connection");
    sink.notify(Notification::error(SEND_FAILED));
}

/// Drains commands already queued without waiting for more.
///
/// Every queued frame is rejected; connect/disconnect requests update
/// `desired_connected` in order. Returns `false` once all senders are gone.
fn reject_stale(
    rx: &mut mpsc::Receiver<ActorCommand>,
    sink: &dyn NotificationSink,
    desired_connected: &mut bool,
) -> bool {
    loop {
        match rx.try_recv() {
            Ok(ActorCommand::Send(_)) => reject_frame(sink),
            Ok(ActorCommand::Connect) => *desired_connected = true,
            Ok(ActorCommand::Disconnect) => *desired_connected = false,
            Err(TryRecvError::Empty) => return true,
            Err(TryRecvError::Disconnected) => return false,
        }
    }
}

fn handle_engine_message(text: &str, sink: &dyn NotificationSink) {
    match serde_json::from_str::<ServerMessage>(text) {
        Ok(ServerMessage::Accepted { strategy_name }) => {
            debug!(%strategy_name, "engine accepted strategy request");
        }
        Ok(ServerMessage::Error { msg, code }) => {
            warn!(?code, "engine error: {msg}");
            sink.notify(Notification::error(format!("Engine error: {msg}")));
        }
        Err(_) => debug!("unrecognized engine message: {text}"),
    }
}

#[derive(Default)]
struct Backoff {
    idx: usize,
}

impl Backoff {
    fn reset(&mut self) {
        self.idx = 0;
    }

    fn next_delay(&mut self) -> Duration {
        let delays = [1, 2, 5, 10];
        let secs = delays.get(self.idx).copied().unwrap_or(10);
        self.idx = (self.idx + 1).min(delays.len());
        Duration::from_secs(secs)
    }
}
