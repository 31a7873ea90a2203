use crate::protocol::{ClientCommand, ErrorCode, InboundMsg, OutboundMsg, ServerMessage};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use tungstenite::protocol::Message;

pub const DEFAULT_ADDR: &str = "127.0.0.1:8765";

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("ws bind failed on {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
    #[error("listener setup failed: {0}")]
    Listener(#[from] std::io::Error),
}

/// Why the active client was dropped.
#[derive(Debug, Error)]
enum ClientError {
    #[error("client sent close")]
    Closed,
    #[error("reply encode failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("ws write failed: {0}")]
    Ws(#[from] tungstenite::Error),
}

struct ActiveClient {
    ws: tungstenite::WebSocket<TcpStream>,
    socket_addr: SocketAddr,
}

pub struct NetworkThread {
    listen_addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    join_handle: Mutex<Option<JoinHandle<()>>>,
}

impl NetworkThread {
    pub fn spawn_with_addr(
        addr: &str,
        in_tx: Sender<InboundMsg>,
        out_rx: Receiver<OutboundMsg>,
    ) -> Result<Self, EngineError> {
        let listener = TcpListener::bind(addr).map_err(|source| EngineError::Bind {
            addr: addr.to_string(),
            source,
        })?;
        listener.set_nonblocking(true)?;
        let listen_addr = listener.local_addr()?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_for_thread = Arc::clone(&shutdown);

        let join_handle =
            thread::spawn(move || run_server(listener, in_tx, out_rx, shutdown_for_thread));

        info!(%listen_addr, "engine stub listening");
        Ok(Self {
            listen_addr,
            shutdown,
            join_handle: Mutex::new(Some(join_handle)),
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        self.listen_addr
    }

    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Ok(mut h) = self.join_handle.lock() {
            if let Some(h) = h.take() {
                let _ = h.join();
            }
        }
    }
}

impl Drop for NetworkThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_server(
    listener: TcpListener,
    in_tx: Sender<InboundMsg>,
    out_rx: Receiver<OutboundMsg>,
    shutdown: Arc<AtomicBool>,
) {
    let mut active: Option<ActiveClient> = None;

    while !shutdown.load(Ordering::Relaxed) {
        // Single-client policy: a new connection replaces the current one.
        loop {
            match listener.accept() {
                Ok((stream, socket_addr)) => {
                    // The accepted socket can inherit non-blocking mode from the listener.
                    let _ = stream.set_nonblocking(false);
                    let _ = stream.set_nodelay(true);
                    let _ = stream.set_read_timeout(Some(Duration::from_millis(30)));
                    let _ = stream.set_write_timeout(Some(Duration::from_millis(200)));

                    let ws = match tungstenite::accept(stream) {
                        Ok(ws) => ws,
                        Err(e) => {
                            warn!(%socket_addr, "ws handshake failed: {e}");
                            continue;
                        }
                    };

                    if let Some(mut prev) = active.take() {
                        debug!(socket_addr = %prev.socket_addr, "replacing active client");
                        let _ = prev.ws.close(None);
                        let _ = in_tx.try_send(InboundMsg::ClientDisconnected);
                    }

                    if in_tx
                        .try_send(InboundMsg::ClientConnected { socket_addr })
                        .is_err()
                    {
                        let mut ws = ws;
                        let _ = send_server_message(
                            &mut ws,
                            &ServerMessage::Error {
                                msg: "server busy".to_string(),
                                code: ErrorCode::Busy,
                            },
                        );
                        let _ = ws.close(None);
                        continue;
                    }

                    info!(%socket_addr, "client connected");
                    active = Some(ActiveClient { ws, socket_addr });
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    warn!("ws accept failed: {e}");
                    break;
                }
            }
        }

        if let Some(client) = active.as_mut() {
            loop {
                match out_rx.try_recv() {
                    Ok(OutboundMsg::Send { msg }) => {
                        if let Err(e) = send_server_message(&mut client.ws, &msg) {
                            debug!("dropping client: {e}");
                            let _ = client.ws.close(None);
                            active = None;
                            let _ = in_tx.try_send(InboundMsg::ClientDisconnected);
                            break;
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => return,
                }
            }
        }

        // At most one inbound frame per pass; read timeouts keep the loop moving.
        if let Some(client) = active.as_mut() {
            match client.ws.read() {
                Ok(msg) => {
                    if let Err(e) = handle_inbound(&in_tx, client, msg) {
                        debug!("dropping client: {e}");
                        let _ = client.ws.close(None);
                        active = None;
                        let _ = in_tx.try_send(InboundMsg::ClientDisconnected);
                    }
                }
                Err(tungstenite::Error::Io(e))
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut => {}
                Err(e) => {
                    debug!("client read ended: {e}");
                    active = None;
                    let _ = in_tx.try_send(InboundMsg::ClientDisconnected);
                }
            }
        } else {
            thread::sleep(Duration::from_millis(25));
        }
    }

    if let Some(mut client) = active {
        let _ = client.ws.close(None);
    }
}

fn handle_inbound(
    in_tx: &Sender<InboundMsg>,
    client: &mut ActiveClient,
    msg: Message,
) -> Result<(), ClientError> {
    let text = match msg {
        Message::Text(s) => s,
        Message::Binary(_) => return Ok(()),
        Message::Ping(payload) => {
            client.ws.send(Message::Pong(payload))?;
            return Ok(());
        }
        Message::Pong(_) => return Ok(()),
        Message::Close(_) => return Err(ClientError::Closed),
        Message::Frame(_) => return Ok(()),
    };

    let cmd: ClientCommand = match serde_json::from_str(&text) {
        Ok(c) => c,
        Err(e) => {
            debug!("rejecting frame: {e}");
            send_server_message(
                &mut client.ws,
                &ServerMessage::Error {
                    msg: "invalid json".to_string(),
                    code: ErrorCode::InvalidCommand,
                },
            )?;
            return Ok(());
        }
    };

    if in_tx.try_send(InboundMsg::Command { cmd }).is_err() {
        send_server_message(
            &mut client.ws,
            &ServerMessage::Error {
                msg: "server busy".to_string(),
                code: ErrorCode::Busy,
            },
        )?;
    }

    Ok(())
}

fn send_server_message(
    ws: &mut tungstenite::WebSocket<TcpStream>,
    msg: &ServerMessage,
) -> Result<(), ClientError> {
    let payload = serde_json::to_string(msg)?;
    ws.send(Message::Text(payload))?;
    Ok(())
}
