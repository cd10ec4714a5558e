//! Error types for the feed engine

use rust_decimal::Decimal;
use thiserror::Error;

/// Feed engine errors
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("WebSocket connection error: {0}")]
    WebSocketConnection(String),

    #[error("WebSocket message error: {0}")]
    WebSocketMessage(String),

    #[error("Not connected")]
    NotConnected,

    #[error("Failed to parse message: {0}")]
    ParseError(String),

    #[error("Negative size {size} for price level {price}")]
    NegativeSize { price: Decimal, size: Decimal },

    #[error("Subscription error: {0}")]
    SubscriptionError(String),

    #[error("Event channel closed")]
    ChannelClosed,
}

impl From<tokio_tungstenite::tungstenite::Error> for FeedError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        FeedError::WebSocketConnection(err.to_string())
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::ParseError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;
