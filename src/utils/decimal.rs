//! Decimal arithmetic utilities for price calculations.

use crate::gateway::Price;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Round to tick size, halves going to the even tick.
pub fn round_to_tick(value: Decimal, tick_size: Decimal) -> Decimal {
    if tick_size == Decimal::ZERO {
        return value;
    }
    (value / tick_size).round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven) * tick_size
}

/// Integer-floored midpoint of a bid/ask pair, rounded onto the tick grid.
pub fn tick_rounded_mid(bid: Price, ask: Price, tick_size: Price) -> Price {
    // The floored mean of two i64 values always fits back into an i64
    let mid = Price::try_from((i128::from(bid) + i128::from(ask)).div_euclid(2)).unwrap_or(bid);
    round_to_tick(Decimal::from(mid), Decimal::from(tick_size))
        .to_i64()
        .unwrap_or(mid)
}

/// Safe division that returns zero if divisor is zero.
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator == Decimal::ZERO {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

/// Calculate basis points (1 bp = 0.01%)
pub fn to_basis_points(rate: Decimal) -> Decimal {
    rate * dec!(10000)
}

/// Edge expressed in basis points of the reference price.
pub fn edge_bps(edge: Price, reference: Price) -> Decimal {
    to_basis_points(safe_div(Decimal::from(edge), Decimal::from(reference))).round_dp(2)
}
