//! Client side of the strategy console.
//!
//! [`CommandDispatcher`] sends `execute_strategy` commands when the engine
//! connection is open and reports everything else through a
//! [`NotificationSink`]. [`HistorySelector`] projects the issued-command log
//! most-recent-first for re-selection. The connection itself lives in
//! [`ws_actor`], which is the only writer of the shared [`ConnectionState`].

pub mod config;
pub mod connection;
pub mod dispatcher;
pub mod history;
pub mod logging;
pub mod notification;
pub mod session;
pub mod transport;
pub mod ws_actor;

pub use config::{ClientConfig, ConfigError};
pub use connection::{ConnectionState, ConnectionStateSource, SharedConnectionState};
pub use dispatcher::{CommandDispatcher, DispatchError};
pub use history::{HistoryItem, HistoryLog, HistoryRow, HistorySelector, HistoryView};
pub use notification::{ChannelSink, Notification, NotificationKind, NotificationSink, TracingSink};
pub use session::ConsoleSession;
pub use strategy_protocol::StrategyRequest;
pub use transport::{ActorTransport, Transport, TransportError};
pub use ws_actor::{ActorCommand, ActorHandle};
