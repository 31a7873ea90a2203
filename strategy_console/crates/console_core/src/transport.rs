use crate::ws_actor::ActorCommand;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to encode command: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("outbound queue is full")]
    ChannelFull,
    #[error("connection actor unavailable")]
    ChannelClosed,
}

/// The single writer onto the engine connection.
///
/// `send_text` must not block; one call is one framed text message.
pub trait Transport: Send + Sync {
    fn send_text(&self, frame: String) -> Result<(), TransportError>;
}

/// Transport backed by the connection actor's command channel.
#[derive(Debug, Clone)]
pub struct ActorTransport {
    tx: mpsc::Sender<ActorCommand>,
}

impl ActorTransport {
    pub fn new(tx: mpsc::Sender<ActorCommand>) -> Self {
        Self { tx }
    }
}

impl Transport for ActorTransport {
    fn send_text(&self, frame: String) -> Result<(), TransportError> {
        self.tx
            .try_send(ActorCommand::Send(frame))
            .map_err(|e| match e {
                TrySendError::Full(_) => TransportError::ChannelFull,
                TrySendError::Closed(_) => TransportError::ChannelClosed,
            })
    }
}
