//! Per-cycle risk throttle.
//!
//! Evaluated at the start of every order-book update, before any trading
//! decision. It only derives flags and says whether everything outstanding
//! must be cancelled; the caller owns the registry and the gateway.

use crate::config::RiskConfig;
use serde::Serialize;
use tracing::warn;

/// Trading permissions derived from inventory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskFlags {
    /// No new buys: position is too long.
    pub disable_buy: bool,
    /// No new sells: position is too short.
    pub disable_sell: bool,
    /// Book updates are ignored until the next own fill clears this.
    pub do_not_buy: bool,
}

/// What a throttle evaluation found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThrottleOutcome {
    /// Outstanding orders reached the cap.
    pub order_cap_breached: bool,
    /// `|position|` exceeded the threshold.
    pub position_breached: bool,
}

impl ThrottleOutcome {
    /// Whether every outstanding order must be cancelled this cycle.
    pub fn requires_cancel_all(&self) -> bool {
        self.order_cap_breached || self.position_breached
    }
}

/// Derives buy/sell permissions from position and outstanding-order count.
#[derive(Debug)]
pub struct RiskThrottle {
    config: RiskConfig,
    flags: RiskFlags,
}

impl RiskThrottle {
    /// Create a throttle with every side enabled.
    pub fn new(config: RiskConfig) -> Self {
        Self {
            config,
            flags: RiskFlags::default(),
        }
    }

    /// Current flags.
    pub fn flags(&self) -> RiskFlags {
        self.flags
    }

    /// Stop reacting to book updates until an own fill arrives.
    pub fn hold_off(&mut self) {
        self.flags.do_not_buy = true;
    }

    /// An own order filled; book updates are processed again.
    pub fn clear_hold_off(&mut self) {
        self.flags.do_not_buy = false;
    }

    /// Recompute flags for this cycle.
    ///
    /// On a position breach only the flag for the breached direction is set;
    /// the opposite flag keeps its previous value until the position is back
    /// within the threshold, at which point both are cleared.
    pub fn evaluate(&mut self, position: i64, outstanding: usize) -> ThrottleOutcome {
        let mut outcome = ThrottleOutcome::default();

        if outstanding >= self.config.max_outstanding_orders {
            warn!(
                outstanding,
                cap = self.config.max_outstanding_orders,
                "Outstanding order cap reached - cancelling all"
            );
            outcome.order_cap_breached = true;
        }

        if position.abs() > self.config.position_threshold {
            outcome.position_breached = true;
            if position > 0 {
                self.flags.disable_buy = true;
            } else {
                self.flags.disable_sell = true;
            }
            warn!(
                position,
                threshold = self.config.position_threshold,
                disable_buy = self.flags.disable_buy,
                disable_sell = self.flags.disable_sell,
                "Position threshold exceeded - cancelling all"
            );
        } else {
            self.flags.disable_buy = false;
            self.flags.disable_sell = false;
        }

        outcome
    }
}
