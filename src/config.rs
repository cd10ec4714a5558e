//! Configuration module for the feed engine

use serde::Deserialize;
use std::env;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Instrument symbols available for subscription (e.g., ["PI_XBTUSD", "PI_ETHUSD"])
    pub instruments: Vec<String>,

    /// WebSocket endpoint for the book feed
    pub feed_url: String,

    /// Heartbeat interval driving periodic re-aggregation, in milliseconds
    pub heartbeat_interval_ms: u64,

    /// Height of a single rendered level row
    pub line_height: f64,

    /// Height of a header bar (column header or spread bar)
    pub header_height: f64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let instruments: Vec<String> = env::var("INSTRUMENTS")
            .unwrap_or_else(|_| "PI_XBTUSD,PI_ETHUSD".to_string())
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .collect();

        Ok(Self {
            instruments,
            feed_url: env::var("FEED_URL")
                .unwrap_or_else(|_| "wss://www.cryptofacilities.com/ws/v1".to_string()),
            heartbeat_interval_ms: env::var("HEARTBEAT_INTERVAL_MS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap_or(1000),
            line_height: env::var("LINE_HEIGHT")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .unwrap_or(20.0),
            header_height: env::var("HEADER_HEIGHT")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .unwrap_or(20.0),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            instruments: vec!["PI_XBTUSD".to_string(), "PI_ETHUSD".to_string()],
            feed_url: "wss://www.cryptofacilities.com/ws/v1".to_string(),
            heartbeat_interval_ms: 1000,
            line_height: 20.0,
            header_height: 20.0,
        }
    }
}
