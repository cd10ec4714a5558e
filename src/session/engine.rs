//! Feed session engine
//!
//! State machine driving the transport, the raw book, and the heartbeat.
//! Runs as a single task: transport messages, heartbeat ticks, and caller
//! commands are serialized through one `select!` loop, and the heartbeat
//! only exists while the session is `Subscribed`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::{FeedClient, SessionCommand, SessionEvent, SessionHandle, SessionState};
use crate::book::{aggregate, select, Layout, PriceLevel, PriceLevelStore, Side};
use crate::config::Config;
use crate::error::Result;
use crate::protocol::FeedMessage;

/// Command channel depth; callers are UI-driven and slow
const COMMAND_BUFFER: usize = 32;
/// Event channel depth; one view per heartbeat plus state transitions
const EVENT_BUFFER: usize = 256;

/// Owns the transport lifecycle and the book for the active instrument
pub struct FeedSession {
    config: Arc<Config>,
    client: FeedClient,
    store: PriceLevelStore,
    state: SessionState,
    instrument: String,
    layout: Option<Layout>,
    commands: mpsc::Receiver<SessionCommand>,
    events: mpsc::Sender<SessionEvent>,
}

impl FeedSession {
    /// Create a session for `instrument` and the handle that drives it
    pub fn new(config: Arc<Config>, instrument: &str) -> (Self, SessionHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);

        let session = Self {
            client: FeedClient::new(&config.feed_url),
            config,
            store: PriceLevelStore::new(),
            state: SessionState::Disconnected,
            instrument: instrument.to_string(),
            layout: None,
            commands: command_rx,
            events: event_tx,
        };

        (session, SessionHandle::new(command_tx, event_rx))
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Drive the session until closed or the handle is dropped.
    ///
    /// Transport failure parks the session in `Reconnecting` (or `Failed`
    /// when the connection never subscribed) until the caller sends
    /// `Reconnect` or `Close`; there is no automatic retry.
    pub async fn run(mut self) -> Result<()> {
        loop {
            match self.connect_and_process().await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    let next = if self.state == SessionState::Subscribed {
                        SessionState::Reconnecting
                    } else {
                        SessionState::Failed
                    };
                    warn!(error = %e, state = ?next, "Transport failure");
                    self.client.close().await;
                    self.transition(next, Some(e.to_string())).await;

                    if !self.park_until_reconnect().await {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// One connection attempt: connect, subscribe, then drain messages,
    /// heartbeat ticks, and commands until close or transport error.
    async fn connect_and_process(&mut self) -> Result<()> {
        self.transition(SessionState::Connecting, None).await;
        self.store.clear();

        self.client.connect().await?;
        self.client.subscribe(&self.instrument).await?;
        self.transition(SessionState::Subscribed, None).await;

        // The heartbeat lives inside this loop only: leaving `Subscribed`
        // drops it, so nothing aggregates against a cleared store.
        let mut heartbeat = interval(Duration::from_millis(self.config.heartbeat_interval_ms));
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    None | Some(SessionCommand::Close) => {
                        self.teardown().await;
                        return Ok(());
                    }
                    Some(SessionCommand::SwitchInstrument(next)) => {
                        self.switch_instrument(next).await?;
                    }
                    Some(SessionCommand::SetLayout(layout)) => {
                        self.layout = Some(layout);
                        self.publish_view().await;
                    }
                    Some(SessionCommand::Reconnect) => {
                        debug!("Reconnect ignored while subscribed");
                    }
                },
                _ = heartbeat.tick() => {
                    self.publish_view().await;
                }
                message = self.client.recv() => match message {
                    Ok(Some(text)) => self.handle_message(&text).await,
                    Ok(None) => {}
                    Err(e) => return Err(e),
                },
            }
        }
    }

    /// Wait for a caller decision while disconnected. Returns true to
    /// re-enter the connect path, false to stop.
    async fn park_until_reconnect(&mut self) -> bool {
        while let Some(command) = self.commands.recv().await {
            match command {
                SessionCommand::Reconnect => return true,
                SessionCommand::Close => {
                    self.teardown().await;
                    return false;
                }
                // Takes effect on the next connect
                SessionCommand::SwitchInstrument(next) => self.instrument = next,
                SessionCommand::SetLayout(layout) => self.layout = Some(layout),
            }
        }
        // Handle dropped
        self.teardown().await;
        false
    }

    async fn switch_instrument(&mut self, next: String) -> Result<()> {
        if next == self.instrument {
            return Ok(());
        }

        info!(from = %self.instrument, to = %next, "Switching instrument");
        self.client.unsubscribe(&self.instrument).await?;
        self.reset_book(next).await;
        self.client.subscribe(&self.instrument).await
    }

    /// Invalidate the book for a new instrument and publish the empty view
    /// that stands until its snapshot arrives
    async fn reset_book(&mut self, next: String) {
        self.store.clear();
        self.instrument = next;
        self.publish_view().await;
    }

    async fn handle_message(&mut self, raw: &str) {
        match FeedMessage::classify(raw) {
            FeedMessage::Snapshot(snapshot) => {
                if self.is_foreign(snapshot.product_id.as_deref()) {
                    debug!(
                        product_id = ?snapshot.product_id,
                        active = %self.instrument,
                        "Discarding snapshot for inactive instrument"
                    );
                    return;
                }
                self.store.apply_snapshot(Side::Bid, &snapshot.bids);
                self.store.apply_snapshot(Side::Ask, &snapshot.asks);
                // A snapshot refreshes the view immediately
                self.publish_view().await;
            }
            FeedMessage::Deltas(batch) => {
                if self.is_foreign(batch.product_id.as_deref()) {
                    debug!(
                        product_id = ?batch.product_id,
                        active = %self.instrument,
                        "Discarding deltas for inactive instrument"
                    );
                    return;
                }
                self.apply_batch(Side::Bid, &batch.bids);
                self.apply_batch(Side::Ask, &batch.asks);
                // Aggregation deferred to the heartbeat to bound render churn
            }
            FeedMessage::Event(value) => {
                debug!(event = %value, "Feed event");
            }
            FeedMessage::Malformed(reason) => {
                warn!(%reason, "Dropping malformed message");
            }
        }
    }

    /// Messages tagged for another instrument arrive around a switch and
    /// must not touch the store
    fn is_foreign(&self, product_id: Option<&str>) -> bool {
        product_id.is_some_and(|id| id != self.instrument)
    }

    fn apply_batch(&mut self, side: Side, levels: &[PriceLevel]) {
        for level in levels {
            if let Err(e) = self.store.apply_delta(side, level.price, level.size) {
                // One bad entry must not poison the rest of the batch
                warn!(error = %e, "Rejecting delta entry");
            }
        }
    }

    async fn publish_view(&mut self) {
        let view = Arc::new(aggregate(&self.store));
        let viewport = self.layout.as_ref().and_then(|layout| select(&view, layout));
        let _ = self.events.send(SessionEvent::View { view, viewport }).await;
    }

    async fn teardown(&mut self) {
        self.client.close().await;
        self.transition(SessionState::Disconnected, None).await;
    }

    async fn transition(&mut self, state: SessionState, message: Option<String>) {
        if self.state == state && message.is_none() {
            return;
        }
        self.state = state;
        info!(state = ?state, "Session state");
        let _ = self.events.send(SessionEvent::State { state, message }).await;
    }
}
