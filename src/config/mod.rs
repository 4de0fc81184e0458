//! Configuration management for the ETF arb trader.
//!
//! Loads settings from environment variables and config files. Every field
//! defaults to the exchange constants the strategy was tuned against.

use crate::gateway::{Price, Volume};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Exchange and order sizing parameters
    #[serde(default)]
    pub trading: TradingConfig,
    /// Risk throttle parameters
    #[serde(default)]
    pub risk: RiskConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingConfig {
    /// Minimum price increment in minor currency units
    #[serde(default = "default_tick_size")]
    pub tick_size: Price,
    /// Maximum volume of a single inserted order
    #[serde(default = "default_max_order_volume")]
    pub max_order_volume: Volume,
    /// Minimum cross-market edge required to trade
    #[serde(default = "default_min_edge")]
    pub min_edge: Price,
    /// Lowest bid price the exchange accepts
    #[serde(default = "default_minimum_bid")]
    pub minimum_bid: Price,
    /// Highest ask price the exchange accepts
    #[serde(default = "default_maximum_ask")]
    pub maximum_ask: Price,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Absolute ETF position above which one side is disabled
    #[serde(default = "default_position_threshold")]
    pub position_threshold: i64,
    /// Outstanding order count at which everything is cancelled
    #[serde(default = "default_max_outstanding_orders")]
    pub max_outstanding_orders: usize,
}

// Default value functions
fn default_tick_size() -> Price {
    100
}

fn default_max_order_volume() -> Volume {
    20
}

fn default_min_edge() -> Price {
    100 // one tick
}

fn default_minimum_bid() -> Price {
    1
}

fn default_maximum_ask() -> Price {
    2_147_483_647 // i32::MAX, the exchange's price ceiling
}

fn default_position_threshold() -> i64 {
    65
}

fn default_max_outstanding_orders() -> usize {
    5
}

impl TradingConfig {
    /// Price used for hedge sells: the exchange minimum bid, moved onto the tick grid.
    pub fn min_bid_nearest_tick(&self) -> Price {
        (self.minimum_bid + self.tick_size) / self.tick_size * self.tick_size
    }

    /// Price used for hedge buys: the exchange maximum ask, floored to the tick grid.
    pub fn max_ask_nearest_tick(&self) -> Price {
        self.maximum_ask / self.tick_size * self.tick_size
    }
}

impl Config {
    /// Load configuration from environment variables and config files.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::default().separator("__").prefix("ETFARB"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.trading.tick_size > 0, "tick_size must be positive");

        anyhow::ensure!(
            self.trading.max_order_volume > 0,
            "max_order_volume must be positive"
        );

        anyhow::ensure!(self.trading.min_edge >= 0, "min_edge must not be negative");

        anyhow::ensure!(
            self.trading.minimum_bid > 0 && self.trading.minimum_bid < self.trading.maximum_ask,
            "minimum_bid must be positive and below maximum_ask"
        );

        anyhow::ensure!(
            self.risk.position_threshold >= 0,
            "position_threshold must not be negative"
        );

        anyhow::ensure!(
            self.risk.max_outstanding_orders >= 1,
            "max_outstanding_orders must be at least 1"
        );

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trading: TradingConfig::default(),
            risk: RiskConfig::default(),
        }
    }
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            tick_size: default_tick_size(),
            max_order_volume: default_max_order_volume(),
            min_edge: default_min_edge(),
            minimum_bid: default_minimum_bid(),
            maximum_ask: default_maximum_ask(),
        }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            position_threshold: default_position_threshold(),
            max_outstanding_orders: default_max_outstanding_orders(),
        }
    }
}
