//! Signed inventory bookkeeping for both legs.

use crate::gateway::{Side, Volume};
use serde::Serialize;
use tracing::debug;

/// ETF position from own fills and the Future position implied by hedges sent.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PositionLedger {
    etf: i64,
    future: i64,
}

impl PositionLedger {
    /// Create a flat ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// ETF units held, positive when long.
    pub fn etf(&self) -> i64 {
        self.etf
    }

    /// Future units implied by hedge orders sent.
    pub fn future(&self) -> i64 {
        self.future
    }

    /// Combined exposure of both legs.
    pub fn net_delta(&self) -> i64 {
        self.etf + self.future
    }

    /// Apply an ETF fill and return the new ETF position.
    pub fn apply_etf_fill(&mut self, side: Side, volume: Volume) -> i64 {
        self.etf += signed(side, volume);
        debug!(etf = self.etf, ?side, volume, "ETF position updated");
        self.etf
    }

    /// Record a hedge order sent on the Future.
    pub fn record_hedge(&mut self, side: Side, volume: Volume) -> i64 {
        self.future += signed(side, volume);
        self.future
    }
}

fn signed(side: Side, volume: Volume) -> i64 {
    match side {
        Side::Buy => i64::from(volume),
        Side::Sell => -i64::from(volume),
    }
}
