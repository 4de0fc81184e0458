//! Cross-market edge rule for the ETF.
//!
//! Sell the ETF into its best bid when that bid clears the Future's best ask
//! by at least the minimum edge; otherwise buy the ETF's best ask when it sits
//! that far below the Future's best bid. Sell is checked first and at most
//! one order comes out of a single ETF update.

use super::market::MarketState;
use super::pricing::{Extreme, PriceLadder};
use crate::config::TradingConfig;
use crate::gateway::{Lifespan, Price, Side, Volume};
use crate::risk::RiskFlags;
use crate::utils::decimal::{edge_bps, tick_rounded_mid};
use tracing::{debug, info};

/// An order the engine wants inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderIntent {
    pub side: Side,
    pub price: Price,
    pub volume: Volume,
    pub lifespan: Lifespan,
}

/// Why no order was produced for a book with both sides populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldReason {
    /// Future best bid or ask not yet known.
    FutureUnknown,
    /// Neither direction clears the minimum edge.
    NoEdge,
    /// An edge exists but the risk throttle disabled that side.
    Throttled(Side),
    /// The counterparty level carried no volume.
    ZeroVolume(Side),
}

/// Outcome of one ETF book evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// ETF best bid or best ask missing.
    NoBook,
    Hold(HoldReason),
    Place(OrderIntent),
}

/// Evaluates ETF book updates against the cached Future quote.
#[derive(Debug)]
pub struct DecisionEngine {
    config: TradingConfig,
}

impl DecisionEngine {
    /// Create a decision engine.
    pub fn new(config: TradingConfig) -> Self {
        Self { config }
    }

    /// Decide on an ETF book update.
    pub fn evaluate(
        &self,
        asks: PriceLadder<'_>,
        bids: PriceLadder<'_>,
        market: &MarketState,
        flags: &RiskFlags,
    ) -> Decision {
        let (best_ask, best_bid) = match (asks.best(Extreme::Lowest), bids.best(Extreme::Highest)) {
            (Some(ask), Some(bid)) => (ask, bid),
            _ => return Decision::NoBook,
        };

        let etf_mid = tick_rounded_mid(best_bid.price, best_ask.price, self.config.tick_size);
        let future_mid = market
            .future_quote()
            .map(|q| tick_rounded_mid(q.best_bid, q.best_ask, self.config.tick_size));
        debug!(
            best_bid = best_bid.price,
            best_ask = best_ask.price,
            etf_mid,
            future_mid = ?future_mid,
            "ETF book evaluated"
        );

        let Some(future) = market.future_quote() else {
            return Decision::Hold(HoldReason::FutureUnknown);
        };

        let min_edge = self.config.min_edge;
        // An edge too large to represent is treated as no edge
        let sell_edge = best_bid.price.checked_sub(future.best_ask).unwrap_or(Price::MIN);
        let buy_edge = future.best_bid.checked_sub(best_ask.price).unwrap_or(Price::MIN);
        let sell_signal = best_bid.price > future.best_ask && sell_edge >= min_edge;
        let buy_signal = best_ask.price < future.best_bid && buy_edge >= min_edge;

        let (side, price, edge, counterparty_volume) = if sell_signal && !flags.disable_sell {
            (Side::Sell, best_bid.price, sell_edge, best_ask.volume)
        } else if buy_signal && !flags.disable_buy {
            (Side::Buy, best_ask.price, buy_edge, best_bid.volume)
        } else if sell_signal {
            return Decision::Hold(HoldReason::Throttled(Side::Sell));
        } else if buy_signal {
            return Decision::Hold(HoldReason::Throttled(Side::Buy));
        } else {
            return Decision::Hold(HoldReason::NoEdge);
        };

        let volume = counterparty_volume.min(self.config.max_order_volume);
        if volume == 0 {
            return Decision::Hold(HoldReason::ZeroVolume(side));
        }

        info!(
            ?side,
            price,
            volume,
            edge,
            edge_bps = %edge_bps(edge, price),
            future_bid = future.best_bid,
            future_ask = future.best_ask,
            "Cross-market edge found"
        );

        Decision::Place(OrderIntent {
            side,
            price,
            volume,
            lifespan: Lifespan::FillAndKill,
        })
    }
}
