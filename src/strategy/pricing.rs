//! Price ladder interpretation.

use crate::gateway::{Price, Volume};

/// Which end of a ladder to pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Highest,
    Lowest,
}

/// A single populated price level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    pub price: Price,
    pub volume: Volume,
}

/// Highest or lowest non-empty price. Zero prices mark empty levels and
/// are ignored; `None` when no level is populated.
pub fn extreme_price(prices: &[Price], extreme: Extreme) -> Option<Price> {
    let populated = prices.iter().copied().filter(|p| *p != 0);
    match extreme {
        Extreme::Highest => populated.max(),
        Extreme::Lowest => populated.min(),
    }
}

/// One side of one instrument's book: parallel prices and volumes.
#[derive(Debug, Clone, Copy)]
pub struct PriceLadder<'a> {
    prices: &'a [Price],
    volumes: &'a [Volume],
}

impl<'a> PriceLadder<'a> {
    /// Pair up a price array with its volumes.
    pub fn new(prices: &'a [Price], volumes: &'a [Volume]) -> Self {
        Self { prices, volumes }
    }

    /// Extreme price and the volume at the first level quoting it.
    pub fn best(&self, extreme: Extreme) -> Option<Level> {
        let price = extreme_price(self.prices, extreme)?;
        let index = self.prices.iter().position(|p| *p == price)?;
        Some(Level {
            price,
            volume: self.volumes.get(index).copied().unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extreme_price_ignores_empty_levels() {
        let prices = [0, 150, 0, 120];
        assert_eq!(extreme_price(&prices, Extreme::Highest), Some(150));
        assert_eq!(extreme_price(&prices, Extreme::Lowest), Some(120));
    }

    #[test]
    fn test_extreme_price_of_empty_ladder() {
        assert_eq!(extreme_price(&[], Extreme::Highest), None);
        assert_eq!(extreme_price(&[0, 0, 0], Extreme::Lowest), None);
    }

    #[test]
    fn test_best_level_volume_from_first_occurrence() {
        let prices = [0, 14900, 15000, 15000];
        let volumes = [9, 4, 7, 2];
        let ladder = PriceLadder::new(&prices, &volumes);

        assert_eq!(
            ladder.best(Extreme::Highest),
            Some(Level { price: 15000, volume: 7 })
        );
        assert_eq!(
            ladder.best(Extreme::Lowest),
            Some(Level { price: 14900, volume: 4 })
        );
    }
}
