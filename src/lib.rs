//! Order book view engine
//!
//! Maintains a live, aggregated view of a two-sided price ladder driven by
//! the `book_ui_1` streaming feed (one snapshot, then incremental deltas),
//! and selects a bounded, orientation-aware window of levels for an
//! external renderer.

pub mod book;
pub mod config;
pub mod error;
pub mod protocol;
pub mod session;

pub use book::{
    aggregate, select, AggregatedLevel, BookView, Layout, Orientation, PriceLevel,
    PriceLevelStore, Side, Viewport,
};
pub use config::Config;
pub use error::{FeedError, Result};
pub use protocol::{BookSnapshot, DeltaBatch, FeedMessage, SubscriptionRequest, FEED_NAME};
pub use session::{
    FeedSession, SessionCommand, SessionEvent, SessionHandle, SessionState,
};
