//! Immediate Future hedging of ETF fills.
//!
//! Hedges are priced at the far end of the admissible range so they cross
//! whatever is resting on the Future book.

use crate::config::TradingConfig;
use crate::gateway::{Price, Side, Volume};

/// A Future order offsetting an ETF fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HedgeIntent {
    pub side: Side,
    pub price: Price,
    pub volume: Volume,
}

/// Maps ETF fills to offsetting Future orders.
#[derive(Debug)]
pub struct HedgeEngine {
    sell_price: Price,
    buy_price: Price,
}

impl HedgeEngine {
    /// Create a hedge engine from the exchange price range.
    pub fn new(config: &TradingConfig) -> Self {
        Self {
            sell_price: config.min_bid_nearest_tick(),
            buy_price: config.max_ask_nearest_tick(),
        }
    }

    /// Hedge for a fill on an ETF order of the given side.
    pub fn hedge_for(&self, filled_side: Side, volume: Volume) -> HedgeIntent {
        let side = filled_side.opposite();
        let price = match side {
            Side::Sell => self.sell_price,
            Side::Buy => self.buy_price,
        };
        HedgeIntent {
            side,
            price,
            volume,
        }
    }
}
