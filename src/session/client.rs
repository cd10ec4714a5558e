//! WebSocket transport for the book feed
//!
//! Handles connection, subscription requests, and message reception.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async,
    tungstenite::protocol::Message,
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, error, info, warn};

use crate::error::{FeedError, Result};
use crate::protocol::SubscriptionRequest;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket client for a single feed connection
pub struct FeedClient {
    stream: Option<WsStream>,
    url: String,
}

impl FeedClient {
    pub fn new(url: &str) -> Self {
        Self {
            stream: None,
            url: url.to_string(),
        }
    }

    /// Open the transport
    pub async fn connect(&mut self) -> Result<()> {
        info!(url = %self.url, "Connecting to book feed");

        let (ws_stream, response) = connect_async(&self.url).await?;

        info!(status = ?response.status(), "WebSocket connected");
        self.stream = Some(ws_stream);

        Ok(())
    }

    /// Request the book feed for an instrument
    pub async fn subscribe(&mut self, instrument: &str) -> Result<()> {
        debug!(%instrument, "Subscribing");
        self.send_request(&SubscriptionRequest::subscribe(instrument))
            .await
    }

    /// Stop the book feed for an instrument
    pub async fn unsubscribe(&mut self, instrument: &str) -> Result<()> {
        debug!(%instrument, "Unsubscribing");
        self.send_request(&SubscriptionRequest::unsubscribe(instrument))
            .await
    }

    async fn send_request(&mut self, request: &SubscriptionRequest) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(FeedError::NotConnected)?;
        let payload = serde_json::to_string(request)?;
        stream
            .send(Message::Text(payload))
            .await
            .map_err(|e| FeedError::SubscriptionError(e.to_string()))
    }

    /// Receive the next message.
    ///
    /// `Ok(None)` means a control frame was handled and there is no payload.
    pub async fn recv(&mut self) -> Result<Option<String>> {
        let stream = self.stream.as_mut().ok_or(FeedError::NotConnected)?;

        match stream.next().await {
            Some(Ok(Message::Text(text))) => {
                debug!(len = text.len(), "Received text message");
                Ok(Some(text))
            }
            Some(Ok(Message::Binary(data))) => {
                let text = String::from_utf8_lossy(&data).to_string();
                Ok(Some(text))
            }
            Some(Ok(Message::Ping(data))) => {
                debug!("Received ping, sending pong");
                if let Some(stream) = self.stream.as_mut() {
                    let _ = stream.send(Message::Pong(data)).await;
                }
                Ok(None)
            }
            Some(Ok(Message::Pong(_))) => Ok(None),
            Some(Ok(Message::Close(frame))) => {
                warn!(frame = ?frame, "Received close frame");
                self.stream = None;
                Err(FeedError::WebSocketConnection(
                    "Connection closed".to_string(),
                ))
            }
            Some(Ok(Message::Frame(_))) => Ok(None),
            Some(Err(e)) => {
                error!(error = %e, "WebSocket error");
                self.stream = None;
                Err(FeedError::WebSocketMessage(e.to_string()))
            }
            None => {
                warn!("WebSocket stream ended");
                self.stream = None;
                Err(FeedError::WebSocketConnection("Stream ended".to_string()))
            }
        }
    }

    /// Close the connection. Idempotent.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.close(None).await;
        }
    }
}
