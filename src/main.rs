//! Demo consumer for the book view engine
//!
//! Runs a feed session for the first configured instrument and logs the
//! trimmed views it emits. Stands in for the rendering collaborator: it
//! supplies the layout inputs and decides when to reconnect.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bookview::{
    Config, FeedSession, Layout, Orientation, SessionEvent, SessionState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let config = Arc::new(Config::load()?);
    let instruments = config.instruments.clone();
    let instrument = instruments
        .first()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("no instruments configured"))?;

    info!(%instrument, url = %config.feed_url, "Starting book view engine");

    let (session, mut handle) = FeedSession::new(config.clone(), &instrument);
    let worker = tokio::spawn(session.run());

    // Toggle the feed between the configured instruments periodically,
    // standing in for the original's "Toggle Feed" button
    let mut active = 0usize;
    let toggle_period = Duration::from_secs(30);
    let mut toggle = tokio::time::interval_at(
        tokio::time::Instant::now() + toggle_period,
        toggle_period,
    );

    // Fixed portrait layout; a real renderer would feed measurements in as
    // orientation and available space change
    handle
        .set_layout(Layout {
            orientation: Orientation::Portrait,
            available_height: 640.0,
            header_height: config.header_height,
            line_height: config.line_height,
        })
        .await?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                let _ = handle.close().await;
                break;
            }
            _ = toggle.tick(), if instruments.len() > 1 => {
                active = (active + 1) % instruments.len();
                info!(instrument = %instruments[active], "Toggling feed");
                if handle.switch_instrument(&instruments[active]).await.is_err() {
                    break;
                }
            }
            event = handle.next_event() => match event {
                Some(SessionEvent::State { state, message }) => {
                    info!(?state, ?message, "Session state");
                    if matches!(state, SessionState::Reconnecting | SessionState::Failed) {
                        // Acting as the user pressing "Reconnect"
                        warn!("Connection lost, requesting reconnect");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                        if handle.reconnect().await.is_err() {
                            break;
                        }
                    }
                }
                Some(SessionEvent::View { view, viewport }) => {
                    info!(
                        best_bid = ?view.best_bid(),
                        best_ask = ?view.best_ask(),
                        spread = %view.spread,
                        spread_percent = %view.spread_percent,
                        bid_rows = viewport.as_ref().map(|v| v.bids.len()).unwrap_or(0),
                        ask_rows = viewport.as_ref().map(|v| v.asks.len()).unwrap_or(0),
                        "Book view"
                    );
                }
                None => break,
            }
        }
    }

    let _ = worker.await;
    Ok(())
}
