//! Cached Future top of book.

use super::pricing::{extreme_price, Extreme};
use crate::gateway::{BookSnapshot, Price};
use tracing::debug;

/// Future best bid/ask, both known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FutureQuote {
    pub best_bid: Price,
    pub best_ask: Price,
}

/// Last observed Future best bid/ask. `None` means unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarketState {
    future_best_bid: Option<Price>,
    future_best_ask: Option<Price>,
}

impl MarketState {
    /// Start with nothing known.
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh from a Future order-book snapshot.
    pub fn update_future(&mut self, book: &BookSnapshot) {
        self.future_best_bid = extreme_price(&book.bid_prices, Extreme::Highest);
        self.future_best_ask = extreme_price(&book.ask_prices, Extreme::Lowest);
        debug!(
            seq = book.sequence_number,
            best_bid = ?self.future_best_bid,
            best_ask = ?self.future_best_ask,
            "Future top of book"
        );
    }

    pub fn future_best_bid(&self) -> Option<Price> {
        self.future_best_bid
    }

    pub fn future_best_ask(&self) -> Option<Price> {
        self.future_best_ask
    }

    /// Both sides, only when both are known.
    pub fn future_quote(&self) -> Option<FutureQuote> {
        Some(FutureQuote {
            best_bid: self.future_best_bid?,
            best_ask: self.future_best_ask?,
        })
    }
}
