//! Error types for the gateway layer.

use super::types::Instrument;
use thiserror::Error;

/// Errors raised while decoding events or delivering commands.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode event on line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode command: {0}")]
    Encode(#[source] serde_json::Error),

    #[error(
        "Malformed {side} ladder for {instrument} seq {sequence_number}: {prices} prices vs {volumes} volumes"
    )]
    MalformedLadder {
        instrument: Instrument,
        sequence_number: u64,
        side: &'static str,
        prices: usize,
        volumes: usize,
    },

    #[error("Invalid {side} price {price} for {instrument} seq {sequence_number}")]
    InvalidPrice {
        instrument: Instrument,
        sequence_number: u64,
        side: &'static str,
        price: i64,
    },
}

impl GatewayError {
    /// Whether the offending input can be skipped and the stream continued.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GatewayError::Decode { .. }
                | GatewayError::MalformedLadder { .. }
                | GatewayError::InvalidPrice { .. }
        )
    }
}
