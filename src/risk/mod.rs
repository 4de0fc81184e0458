//! Risk management for the ETF/Future arbitrage.
//!
//! Provides inventory bookkeeping and per-cycle throttling:
//! - Signed ETF position and hedged Future position
//! - Side disabling when the position breaches its threshold
//! - Cancel-all when too many orders are outstanding

mod ledger;
mod throttle;

pub use ledger::PositionLedger;
pub use throttle::{RiskFlags, RiskThrottle, ThrottleOutcome};
