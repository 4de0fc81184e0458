//! Gateway boundary between the trading core and the exchange.
//!
//! The core never talks to a socket. It receives [`GatewayEvent`]s one at a
//! time and hands [`Command`]s to a [`Gateway`] sink:
//! - `channel`: command sink backed by a tokio channel, plus a JSON-lines writer
//! - `source`: JSON-lines event source for replaying recorded sessions
//! - `mock`: in-memory recording sink for tests and dry runs

pub mod channel;
mod error;
pub mod mock;
pub mod source;
mod types;

pub use channel::{write_commands, ChannelGateway};
pub use error::GatewayError;
pub use mock::RecordingGateway;
pub use source::{pump_events, EventSource, JsonLinesSource};
pub use types::*;

/// Outbound side of the gateway.
///
/// Sending must never block the event loop; delivery failures are the
/// sink's problem to log, not the caller's to retry.
#[cfg_attr(test, mockall::automock)]
pub trait Gateway {
    /// Fire a command at the exchange.
    fn send(&mut self, command: Command);
}
