//! Two-sided price ladder: ordered mapping price -> level for each side.
//!
//! Backed by `BTreeMap`, which gives O(log n) insert/erase by price and
//! cheap access at the min/max end. The best bid is the greatest key, the
//! best ask the least. Adequate for books of hundreds to low thousands of
//! active levels; a denser book would swap this for a price-bucket array
//! without touching the matching code.

use std::collections::BTreeMap;

use crate::message::{Price, Qty, Side};
use crate::price_level::PriceLevel;

/// Bid and ask side indexes.
///
/// Invariant: no level with `count == 0` is ever present; callers erase a
/// level the instant it empties.
#[derive(Debug, Default)]
pub struct Ladder {
    bids: BTreeMap<Price, PriceLevel>,
    asks: BTreeMap<Price, PriceLevel>,
}

impl Ladder {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn side(&self, side: Side) -> &BTreeMap<Price, PriceLevel> {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    #[inline]
    fn side_mut(&mut self, side: Side) -> &mut BTreeMap<Price, PriceLevel> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    /// Most aggressive price on a side: greatest bid, least ask.
    #[inline]
    pub fn best_price(&self, side: Side) -> Option<Price> {
        match side {
            Side::Buy => self.bids.last_key_value().map(|(&price, _)| price),
            Side::Sell => self.asks.first_key_value().map(|(&price, _)| price),
        }
    }

    /// Level at the best price, if the side is non-empty.
    #[inline]
    pub fn best_level(&self, side: Side) -> Option<&PriceLevel> {
        match side {
            Side::Buy => self.bids.last_key_value().map(|(_, level)| level),
            Side::Sell => self.asks.first_key_value().map(|(_, level)| level),
        }
    }

    #[inline]
    pub fn level(&self, side: Side, price: Price) -> Option<&PriceLevel> {
        self.side(side).get(&price)
    }

    #[inline]
    pub fn level_mut(&mut self, side: Side, price: Price) -> Option<&mut PriceLevel> {
        self.side_mut(side).get_mut(&price)
    }

    /// Level at `price`, created empty on first use.
    #[inline]
    pub fn get_or_create(&mut self, side: Side, price: Price) -> &mut PriceLevel {
        self.side_mut(side).entry(price).or_default()
    }

    /// Erase a level that has just emptied.
    #[inline]
    pub fn remove_level(&mut self, side: Side, price: Price) {
        let removed = self.side_mut(side).remove(&price);
        debug_assert!(removed.map_or(true, |level| level.is_empty()));
    }

    /// Sum of `cached_qty` over every level on a side. Linear in the
    /// number of levels.
    pub fn total_qty(&self, side: Side) -> Qty {
        self.side(side).values().map(|level| level.cached_qty).sum()
    }

    /// Number of populated levels on a side.
    #[inline]
    pub fn depth(&self, side: Side) -> usize {
        self.side(side).len()
    }

    /// Levels of a side in priority order (best first).
    pub fn levels(&self, side: Side) -> Box<dyn Iterator<Item = (Price, &PriceLevel)> + '_> {
        match side {
            Side::Buy => Box::new(self.bids.iter().rev().map(|(&price, level)| (price, level))),
            Side::Sell => Box::new(self.asks.iter().map(|(&price, level)| (price, level))),
        }
    }
}
