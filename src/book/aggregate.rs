//! Book aggregation
//!
//! Pure function from raw levels to an immutable view: cumulative totals,
//! side totals, spread and spread percentage. No hidden state; the same
//! store always aggregates to the same view.

use rust_decimal::{Decimal, RoundingStrategy};

use super::{AggregatedLevel, BookView, PriceLevel, PriceLevelStore};

/// Build an aggregated view from the current raw levels.
///
/// An empty book aggregates to an empty view with zero totals and zero
/// spread; spread is only defined when both sides are populated.
pub fn aggregate(store: &PriceLevelStore) -> BookView {
    let (bids, total_bid_size) = accumulate(store.bids());
    let (asks, total_ask_size) = accumulate(store.asks());

    let (spread, spread_percent) = match (bids.first(), asks.first()) {
        (Some(best_bid), Some(best_ask)) => {
            let spread = best_ask.price - best_bid.price;
            let percent = (spread / best_bid.price * Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            (spread, percent)
        }
        _ => (Decimal::ZERO, Decimal::ZERO),
    };

    BookView {
        bids,
        asks,
        total_bid_size,
        total_ask_size,
        spread,
        spread_percent,
    }
}

/// Walk one side in best-first order, annotating each level with the
/// running total. Returns the levels and the final total for the side.
fn accumulate(levels: impl Iterator<Item = PriceLevel>) -> (Vec<AggregatedLevel>, Decimal) {
    let mut total = Decimal::ZERO;
    let aggregated = levels
        .map(|level| {
            total += level.size;
            AggregatedLevel {
                price: level.price,
                size: level.size,
                total,
            }
        })
        .collect();
    (aggregated, total)
}
