//! Event and command definitions exchanged with the gateway.

use super::error::GatewayError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Client-assigned order identifier.
pub type OrderId = u64;
/// Price in minor currency units.
pub type Price = i64;
/// Order or level volume in lots.
pub type Volume = u32;

/// Instrument an order book or trade tick stream belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Instrument {
    Etf,
    Future,
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instrument::Etf => write!(f, "ETF"),
            Instrument::Future => write!(f, "FUTURE"),
        }
    }
}

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side that offsets this one.
    pub fn opposite(&self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// How long an inserted order may rest on the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Lifespan {
    GoodForDay,
    /// Execute immediately, cancel the remainder.
    FillAndKill,
}

/// Full-depth snapshot of one instrument's book (or its trade ticks).
///
/// Price and volume arrays are parallel and ordered best to worst. A price
/// of zero marks an empty level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub instrument: Instrument,
    pub sequence_number: u64,
    pub ask_prices: Vec<Price>,
    pub ask_volumes: Vec<Volume>,
    pub bid_prices: Vec<Price>,
    pub bid_volumes: Vec<Volume>,
}

impl BookSnapshot {
    /// Check that both ladders have matching price/volume lengths and no
    /// negative prices.
    pub fn validate(&self) -> Result<(), GatewayError> {
        check_ladder(self, "ask", self.ask_prices.len(), self.ask_volumes.len())?;
        check_ladder(self, "bid", self.bid_prices.len(), self.bid_volumes.len())?;
        check_prices(self, "ask", &self.ask_prices)?;
        check_prices(self, "bid", &self.bid_prices)
    }
}

fn check_prices(
    book: &BookSnapshot,
    side: &'static str,
    prices: &[Price],
) -> Result<(), GatewayError> {
    match prices.iter().find(|p| **p < 0) {
        None => Ok(()),
        Some(price) => Err(GatewayError::InvalidPrice {
            instrument: book.instrument,
            sequence_number: book.sequence_number,
            side,
            price: *price,
        }),
    }
}

fn check_ladder(
    book: &BookSnapshot,
    side: &'static str,
    prices: usize,
    volumes: usize,
) -> Result<(), GatewayError> {
    if prices == volumes {
        return Ok(());
    }
    Err(GatewayError::MalformedLadder {
        instrument: book.instrument,
        sequence_number: book.sequence_number,
        side,
        prices,
        volumes,
    })
}

/// Inbound events delivered by the gateway, one at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayEvent {
    OrderBookUpdate(BookSnapshot),
    /// Informational only.
    TradeTicks(BookSnapshot),
    OrderFilled {
        order_id: OrderId,
        price: Price,
        volume: Volume,
    },
    OrderStatus {
        order_id: OrderId,
        fill_volume: Volume,
        remaining_volume: Volume,
        fees: i64,
    },
    HedgeFilled {
        order_id: OrderId,
        price: Price,
        volume: Volume,
    },
    Error {
        order_id: OrderId,
        message: String,
    },
}

impl GatewayEvent {
    /// Structural validation applied at decode time.
    pub fn validate(&self) -> Result<(), GatewayError> {
        match self {
            GatewayEvent::OrderBookUpdate(book) | GatewayEvent::TradeTicks(book) => book.validate(),
            _ => Ok(()),
        }
    }
}

/// Outbound commands sent to the gateway. Fire-and-forget: outcomes come
/// back later as separate events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    InsertOrder {
        order_id: OrderId,
        side: Side,
        price: Price,
        volume: Volume,
        lifespan: Lifespan,
    },
    CancelOrder {
        order_id: OrderId,
    },
    HedgeOrder {
        order_id: OrderId,
        side: Side,
        price: Price,
        volume: Volume,
    },
}

impl Command {
    /// Order id this command refers to.
    pub fn order_id(&self) -> OrderId {
        match self {
            Command::InsertOrder { order_id, .. }
            | Command::CancelOrder { order_id }
            | Command::HedgeOrder { order_id, .. } => *order_id,
        }
    }
}
