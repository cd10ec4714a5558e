//! Viewport selection
//!
//! Trims an aggregated view down to the bounded window of levels that fits
//! the available display space for the current orientation. Stateless;
//! re-invoked whenever the view, orientation, or measurements change.

use serde::{Deserialize, Serialize};

use super::{AggregatedLevel, BookView};

/// Display orientation signal supplied by the external collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn is_landscape(&self) -> bool {
        matches!(self, Orientation::Landscape)
    }
}

/// Layout measurements for viewport capacity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub orientation: Orientation,
    /// Total height available to the book container
    pub available_height: f64,
    /// Height of one header bar (column header or spread bar)
    pub header_height: f64,
    /// Height of one rendered level row
    pub line_height: f64,
}

impl Layout {
    /// Number of level rows that fit per side.
    ///
    /// Portrait stacks a spread header between the two sides, costing a
    /// second header and halving the per-side share; landscape shows the
    /// spread inline and gives each side the full column.
    pub fn capacity_per_side(&self) -> usize {
        let mut usable = self.available_height - self.header_height;
        if !self.orientation.is_landscape() {
            usable -= self.header_height;
        }
        let per_side = if self.orientation.is_landscape() {
            1.0
        } else {
            2.0
        };
        let capacity = (usable / self.line_height / per_side).trunc();
        if capacity > 0.0 {
            capacity as usize
        } else {
            0
        }
    }
}

/// Viewport-trimmed subset of a book view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Best-first bids (descending price)
    pub bids: Vec<AggregatedLevel>,
    /// Landscape: best-first asks (ascending). Portrait: the farthest-from-best
    /// asks, worst-first (descending), so the list reads toward the spread line.
    pub asks: Vec<AggregatedLevel>,
}

/// Select the window of levels that fits the layout.
///
/// Returns `None` when no rows fit; the caller keeps its previous viewport
/// rather than rendering an abruptly empty book.
///
/// The portrait ask inversion mirrors the reference display convention and
/// is intentional; it is pending product sign-off, not a sorting bug.
pub fn select(view: &BookView, layout: &Layout) -> Option<Viewport> {
    let capacity = layout.capacity_per_side();
    if capacity == 0 {
        return None;
    }

    let bids: Vec<_> = view.bids.iter().take(capacity).copied().collect();
    let asks: Vec<_> = if layout.orientation.is_landscape() {
        view.asks.iter().take(capacity).copied().collect()
    } else {
        view.asks.iter().rev().take(capacity).copied().collect()
    };

    Some(Viewport { bids, asks })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::{aggregate, PriceLevelStore, Side};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn view_with_depth(levels: usize) -> BookView {
        let mut store = PriceLevelStore::new();
        for i in 0..levels {
            let offset = Decimal::from(i as u32);
            store
                .apply_delta(Side::Bid, dec!(100) - offset, dec!(1))
                .unwrap();
            store
                .apply_delta(Side::Ask, dec!(101) + offset, dec!(1))
                .unwrap();
        }
        aggregate(&store)
    }

    #[test]
    fn test_portrait_capacity() {
        // usable = 140 - 20 - 20 = 100; capacity = trunc(100 / 20 / 2) = 2
        let layout = Layout {
            orientation: Orientation::Portrait,
            available_height: 140.0,
            header_height: 20.0,
            line_height: 20.0,
        };
        assert_eq!(layout.capacity_per_side(), 2);

        let viewport = select(&view_with_depth(5), &layout).unwrap();
        assert_eq!(viewport.bids.len(), 2);
        assert_eq!(viewport.asks.len(), 2);

        // Best-first bids
        assert_eq!(viewport.bids[0].price, dec!(100));
        assert_eq!(viewport.bids[1].price, dec!(99));
        // Portrait asks: farthest-from-best first
        assert_eq!(viewport.asks[0].price, dec!(105));
        assert_eq!(viewport.asks[1].price, dec!(104));
    }

    #[test]
    fn test_landscape_capacity_and_order() {
        // usable = 120 - 20 = 100; capacity = trunc(100 / 20) = 5
        let layout = Layout {
            orientation: Orientation::Landscape,
            available_height: 120.0,
            header_height: 20.0,
            line_height: 20.0,
        };
        assert_eq!(layout.capacity_per_side(), 5);

        let viewport = select(&view_with_depth(8), &layout).unwrap();
        assert_eq!(viewport.bids.len(), 5);
        assert_eq!(viewport.asks.len(), 5);
        // Best-first asks in landscape
        assert_eq!(viewport.asks[0].price, dec!(101));
        assert_eq!(viewport.asks[4].price, dec!(105));
    }

    #[test]
    fn test_zero_capacity_yields_no_selection() {
        let layout = Layout {
            orientation: Orientation::Portrait,
            available_height: 40.0,
            header_height: 20.0,
            line_height: 20.0,
        };
        assert_eq!(layout.capacity_per_side(), 0);
        assert!(select(&view_with_depth(3), &layout).is_none());
    }

    #[test]
    fn test_negative_usable_space() {
        let layout = Layout {
            orientation: Orientation::Portrait,
            available_height: 10.0,
            header_height: 20.0,
            line_height: 20.0,
        };
        assert_eq!(layout.capacity_per_side(), 0);
    }

    #[test]
    fn test_shallow_book_selects_what_exists() {
        let layout = Layout {
            orientation: Orientation::Landscape,
            available_height: 220.0,
            header_height: 20.0,
            line_height: 20.0,
        };
        let viewport = select(&view_with_depth(3), &layout).unwrap();
        assert_eq!(viewport.bids.len(), 3);
        assert_eq!(viewport.asks.len(), 3);
    }

    #[test]
    fn test_totals_carried_through_selection() {
        let layout = Layout {
            orientation: Orientation::Portrait,
            available_height: 140.0,
            header_height: 20.0,
            line_height: 20.0,
        };
        let view = view_with_depth(5);
        let viewport = select(&view, &layout).unwrap();
        // Cumulative totals come from the full view, not the trimmed window
        assert_eq!(viewport.asks[0].total, dec!(5));
    }
}
