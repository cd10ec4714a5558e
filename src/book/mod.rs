//! Order book module
//!
//! Raw level storage, aggregation into immutable views, and viewport
//! selection for a bounded display window.

mod aggregate;
mod store;
mod viewport;

pub use aggregate::aggregate;
pub use store::PriceLevelStore;
pub use viewport::{select, Layout, Orientation, Viewport};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Side of the order book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Bid,
    Ask,
}

/// A single raw level: resting volume at a price point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Decimal,
    pub size: Decimal,
}

/// A level annotated with the running total from the best price outward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedLevel {
    pub price: Decimal,
    pub size: Decimal,
    /// Cumulative size from the best level on this side down to this one
    pub total: Decimal,
}

/// Immutable aggregated view of the book, rebuilt on every aggregation cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookView {
    /// Best-first: strictly descending by price
    pub bids: Vec<AggregatedLevel>,
    /// Best-first: strictly ascending by price
    pub asks: Vec<AggregatedLevel>,
    pub total_bid_size: Decimal,
    pub total_ask_size: Decimal,
    /// Best ask minus best bid; zero when either side is empty
    pub spread: Decimal,
    /// Spread over best bid, in percent, rounded half-up to 2 decimals
    pub spread_percent: Decimal,
}

impl BookView {
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.first().map(|level| level.price)
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.first().map(|level| level.price)
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}
