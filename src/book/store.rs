//! Raw price level storage
//!
//! Uses BTreeMap so each side iterates in best-first order without
//! re-sorting on every aggregation cycle.

use rust_decimal::Decimal;
use std::cmp::Reverse;
use std::collections::BTreeMap;

use super::{PriceLevel, Side};
use crate::error::{FeedError, Result};

/// Unaggregated bid/ask levels for the active instrument.
///
/// Mutation never triggers aggregation; the session decides when to
/// recompute a view, decoupling ingestion rate from render rate.
#[derive(Debug, Default)]
pub struct PriceLevelStore {
    /// Bids keyed for descending iteration (highest price first)
    bids: BTreeMap<Reverse<Decimal>, Decimal>,
    /// Asks keyed for ascending iteration (lowest price first)
    asks: BTreeMap<Decimal, Decimal>,
}

impl PriceLevelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace one side wholesale with snapshot levels.
    ///
    /// Non-positive sizes are skipped; duplicate prices are last-write-wins.
    pub fn apply_snapshot(&mut self, side: Side, levels: &[PriceLevel]) {
        match side {
            Side::Bid => {
                self.bids.clear();
                for level in levels {
                    if level.size > Decimal::ZERO {
                        self.bids.insert(Reverse(level.price), level.size);
                    }
                }
            }
            Side::Ask => {
                self.asks.clear();
                for level in levels {
                    if level.size > Decimal::ZERO {
                        self.asks.insert(level.price, level.size);
                    }
                }
            }
        }
    }

    /// Apply a single delta entry: upsert on positive size, remove on zero.
    ///
    /// Removing an absent level is a no-op. A negative size is a protocol
    /// violation; the entry is rejected and the store left untouched.
    pub fn apply_delta(&mut self, side: Side, price: Decimal, size: Decimal) -> Result<()> {
        if size < Decimal::ZERO {
            return Err(FeedError::NegativeSize { price, size });
        }

        match side {
            Side::Bid => {
                if size == Decimal::ZERO {
                    self.bids.remove(&Reverse(price));
                } else {
                    self.bids.insert(Reverse(price), size);
                }
            }
            Side::Ask => {
                if size == Decimal::ZERO {
                    self.asks.remove(&price);
                } else {
                    self.asks.insert(price, size);
                }
            }
        }

        Ok(())
    }

    /// Drop all levels on both sides (instrument switch or teardown)
    pub fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
    }

    /// Bid levels in best-first (descending price) order
    pub fn bids(&self) -> impl Iterator<Item = PriceLevel> + '_ {
        self.bids.iter().map(|(Reverse(price), size)| PriceLevel {
            price: *price,
            size: *size,
        })
    }

    /// Ask levels in best-first (ascending price) order
    pub fn asks(&self) -> impl Iterator<Item = PriceLevel> + '_ {
        self.asks.iter().map(|(price, size)| PriceLevel {
            price: *price,
            size: *size,
        })
    }

    pub fn bid_count(&self) -> usize {
        self.bids.len()
    }

    pub fn ask_count(&self) -> usize {
        self.asks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}
