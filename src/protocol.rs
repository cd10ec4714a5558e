//! Wire protocol for the book_ui_1 feed
//!
//! Handles serialization of subscription requests and classification of
//! incoming messages into snapshots, delta batches, and feed events.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::book::PriceLevel;

/// Feed identifier used in subscription requests
pub const FEED_NAME: &str = "book_ui_1";

/// Subscribe/unsubscribe request sent over the stream
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionRequest {
    pub event: &'static str,
    pub feed: &'static str,
    pub product_ids: Vec<String>,
}

impl SubscriptionRequest {
    pub fn subscribe(instrument: &str) -> Self {
        Self {
            event: "subscribe",
            feed: FEED_NAME,
            product_ids: vec![instrument.to_string()],
        }
    }

    pub fn unsubscribe(instrument: &str) -> Self {
        Self {
            event: "unsubscribe",
            feed: FEED_NAME,
            product_ids: vec![instrument.to_string()],
        }
    }
}

/// Full book snapshot, delivered once per subscription
#[derive(Debug, Clone, Deserialize)]
pub struct BookSnapshot {
    pub feed: String,

    #[serde(default)]
    pub product_id: Option<String>,

    #[serde(rename = "numLevels")]
    pub num_levels: u32,

    #[serde(default, deserialize_with = "deserialize_levels")]
    pub bids: Vec<PriceLevel>,

    #[serde(default, deserialize_with = "deserialize_levels")]
    pub asks: Vec<PriceLevel>,
}

/// Incremental delta batch; either side may be absent
#[derive(Debug, Clone, Deserialize)]
pub struct DeltaBatch {
    #[serde(default)]
    pub product_id: Option<String>,

    #[serde(default, deserialize_with = "deserialize_levels")]
    pub bids: Vec<PriceLevel>,

    #[serde(default, deserialize_with = "deserialize_levels")]
    pub asks: Vec<PriceLevel>,
}

/// Classified feed message
#[derive(Debug, Clone)]
pub enum FeedMessage {
    Snapshot(BookSnapshot),
    Deltas(DeltaBatch),
    /// Well-formed JSON that is neither a snapshot nor a delta batch
    /// (subscribe confirmations, info/alert events)
    Event(serde_json::Value),
    Malformed(String),
}

impl FeedMessage {
    /// Classify a raw message from the transport.
    ///
    /// A message carrying both `feed` and `numLevels` is a snapshot; any
    /// other message carrying a `bids` or `asks` array is a delta batch.
    pub fn classify(raw: &str) -> Self {
        let value: serde_json::Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => return FeedMessage::Malformed(e.to_string()),
        };

        if value.get("feed").is_some() && value.get("numLevels").is_some() {
            return match serde_json::from_value::<BookSnapshot>(value) {
                Ok(snapshot) => FeedMessage::Snapshot(snapshot),
                Err(e) => FeedMessage::Malformed(e.to_string()),
            };
        }

        if value.get("bids").is_some() || value.get("asks").is_some() {
            return match serde_json::from_value::<DeltaBatch>(value) {
                Ok(deltas) => FeedMessage::Deltas(deltas),
                Err(e) => FeedMessage::Malformed(e.to_string()),
            };
        }

        FeedMessage::Event(value)
    }
}

/// Deserialize `[[price, size], ...]` arrays into price levels
fn deserialize_levels<'de, D>(deserializer: D) -> Result<Vec<PriceLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<(Decimal, Decimal)> = Deserialize::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(price, size)| PriceLevel { price, size })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_classify_snapshot() {
        let raw = r#"{
            "feed": "book_ui_1_snapshot",
            "product_id": "PI_XBTUSD",
            "numLevels": 2,
            "bids": [[44500.5, 2000.0], [44490.0, 1500.0]],
            "asks": [[44510.0, 800.0], [44520.5, 3200.0]]
        }"#;

        match FeedMessage::classify(raw) {
            FeedMessage::Snapshot(snapshot) => {
                assert_eq!(snapshot.product_id.as_deref(), Some("PI_XBTUSD"));
                assert_eq!(snapshot.num_levels, 2);
                assert_eq!(snapshot.bids.len(), 2);
                assert_eq!(snapshot.bids[0].price, dec!(44500.5));
                assert_eq!(snapshot.asks[1].size, dec!(3200.0));
            }
            other => panic!("Expected Snapshot, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_delta_batch() {
        let raw = r#"{
            "product_id": "PI_XBTUSD",
            "bids": [[44500.5, 0]],
            "asks": [[44515.0, 750.0]]
        }"#;

        match FeedMessage::classify(raw) {
            FeedMessage::Deltas(deltas) => {
                assert_eq!(deltas.bids.len(), 1);
                assert_eq!(deltas.bids[0].size, Decimal::ZERO);
                assert_eq!(deltas.asks[0].price, dec!(44515.0));
            }
            other => panic!("Expected Deltas, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_single_sided_delta() {
        let raw = r#"{"asks": [[44520.0, 100.0]]}"#;

        match FeedMessage::classify(raw) {
            FeedMessage::Deltas(deltas) => {
                assert!(deltas.bids.is_empty());
                assert_eq!(deltas.asks.len(), 1);
            }
            other => panic!("Expected Deltas, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_subscribe_ack_as_event() {
        let raw = r#"{"event":"subscribed","feed":"book_ui_1","product_ids":["PI_XBTUSD"]}"#;
        assert!(matches!(FeedMessage::classify(raw), FeedMessage::Event(_)));
    }

    #[test]
    fn test_classify_malformed() {
        assert!(matches!(
            FeedMessage::classify("not json at all"),
            FeedMessage::Malformed(_)
        ));
        // Snapshot discriminator present but levels unparseable
        let raw = r#"{"feed":"book_ui_1_snapshot","numLevels":2,"bids":"oops","asks":[]}"#;
        assert!(matches!(
            FeedMessage::classify(raw),
            FeedMessage::Malformed(_)
        ));
    }

    #[test]
    fn test_subscription_request_shape() {
        let msg = serde_json::to_value(SubscriptionRequest::subscribe("PI_ETHUSD")).unwrap();
        assert_eq!(
            msg,
            serde_json::json!({
                "event": "subscribe",
                "feed": "book_ui_1",
                "product_ids": ["PI_ETHUSD"]
            })
        );
    }
}
