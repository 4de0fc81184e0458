//! # ETF Arb Trader
//!
//! An event-driven trading agent that arbitrages short-lived price
//! dislocations between an ETF and its correlated future, hedging every
//! ETF fill in the future immediately.
//!
//! ## Architecture
//!
//! - `config`: Configuration management and validation
//! - `gateway`: Typed events in, typed commands out (plus JSON-lines plumbing)
//! - `orders`: Order id allocation and the open-order registry
//! - `risk`: Position ledger and the risk throttle
//! - `strategy`: Price extraction, market state, decision rule and hedging
//! - `trader`: The `AutoTrader` context that owns all core state
//! - `utils`: Shared utilities and decimal arithmetic

pub mod config;
pub mod gateway;
pub mod orders;
pub mod risk;
pub mod strategy;
pub mod trader;
pub mod utils;

pub use config::Config;
pub use trader::AutoTrader;
