use crate::connection::{ConnectionState, ConnectionStateSource};
use crate::notification::{Notification, NotificationSink, CONNECTION_LOST, SEND_FAILED};
use crate::transport::{Transport, TransportError};
use std::sync::Arc;
use strategy_protocol::{ClientCommand, StrategyRequest};
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no active connection (state: {state})")]
    ConnectionNotReady { state: ConnectionState },
    #[error("transmission failed: {0}")]
    TransmissionFailure(#[from] TransportError),
}

impl DispatchError {
    /// The user-facing message for this failure.
    pub fn notification(&self) -> Notification {
        match self {
            DispatchError::ConnectionNotReady { .. } => Notification::error(CONNECTION_LOST),
            DispatchError::TransmissionFailure(_) => Notification::error(SEND_FAILED),
        }
    }
}

/// Sends `execute_strategy` commands, guarded on the connection state.
///
/// The state is read on every call. Failures are reported to the sink and
/// never returned from [`CommandDispatcher::dispatch`].
pub struct CommandDispatcher {
    state: Arc<dyn ConnectionStateSource>,
    transport: Arc<dyn Transport>,
    sink: Arc<dyn NotificationSink>,
}

impl CommandDispatcher {
    pub fn new(
        state: Arc<dyn ConnectionStateSource>,
        transport: Arc<dyn Transport>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            state,
            transport,
            sink,
        }
    }

    /// Transmits `payload`, or pushes exactly one error notification.
    pub fn dispatch(&self, payload: &StrategyRequest) {
        if let Err(err) = self.try_dispatch(payload) {
            error!(strategy_name = %payload.strategy_name, "strategy request not sent: {err}");
            self.sink.notify(err.notification());
        }
    }

    /// Same as [`dispatch`](Self::dispatch) without the notification step.
    pub fn try_dispatch(&self, payload: &StrategyRequest) -> Result<(), DispatchError> {
        let state = self.state.current();
        if state != ConnectionState::Open {
            return Err(DispatchError::ConnectionNotReady { state });
        }

        let frame = encode_envelope(payload).map_err(TransportError::from)?;
        debug!(strategy_name = %payload.strategy_name, "sending strategy request");
        self.transport.send_text(frame)?;
        Ok(())
    }
}

pub fn encode_envelope(payload: &StrategyRequest) -> Result<String, serde_json::Error> {
    serde_json::to_string(&ClientCommand::execute(payload.clone()))
}
