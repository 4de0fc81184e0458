//! Trading strategy implementation.
//!
//! Contains the core logic for:
//! - Reducing price ladders to best prices
//! - Caching the Future's top of book
//! - The cross-market edge rule that decides ETF orders
//! - Offsetting every ETF fill with a Future hedge

mod decision;
mod hedge;
mod market;
mod pricing;

pub use decision::{Decision, DecisionEngine, HoldReason, OrderIntent};
pub use hedge::{HedgeEngine, HedgeIntent};
pub use market::{FutureQuote, MarketState};
pub use pricing::{extreme_price, Extreme, Level, PriceLadder};
