//! Feed session module
//!
//! The session owns the transport lifecycle and the raw book for one
//! instrument at a time. Callers drive it through a [`SessionHandle`]
//! (commands in, events out); all store mutation happens on the session
//! task, so no aggregation can observe a partially-applied batch.

mod client;
mod engine;

pub use client::FeedClient;
pub use engine::FeedSession;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::book::{BookView, Layout, Viewport};
use crate::error::{FeedError, Result};

/// Lifecycle state of a feed session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Subscribed,
    /// An established session lost its transport; awaiting an explicit
    /// reconnect from the caller
    Reconnecting,
    /// The session never reached `Subscribed`; awaiting an explicit reconnect
    Failed,
}

/// Commands accepted by a running session
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// Unsubscribe the active instrument, reset the book, subscribe the new one
    SwitchInstrument(String),
    /// Update viewport measurements; re-emits the current view trimmed to fit
    SetLayout(Layout),
    /// Re-enter the connect path from `Reconnecting`/`Failed`
    Reconnect,
    /// Tear down the transport and stop. Idempotent.
    Close,
}

/// Events emitted by a session, delivered in order on a single channel
#[derive(Debug, Clone)]
pub enum SessionEvent {
    State {
        state: SessionState,
        /// Human-readable reason, set on error transitions
        message: Option<String>,
    },
    View {
        view: Arc<BookView>,
        /// Trimmed selection for the current layout; `None` when no layout is
        /// set or no rows fit (keep the previous viewport)
        viewport: Option<Viewport>,
    },
}

/// Caller-side handle to a session
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    events: mpsc::Receiver<SessionEvent>,
}

impl SessionHandle {
    pub(crate) fn new(
        commands: mpsc::Sender<SessionCommand>,
        events: mpsc::Receiver<SessionEvent>,
    ) -> Self {
        Self { commands, events }
    }

    /// Wait for the next session event; `None` once the session has stopped
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    /// Non-blocking poll for the next event
    pub fn try_next_event(&mut self) -> Option<SessionEvent> {
        self.events.try_recv().ok()
    }

    pub async fn switch_instrument(&self, instrument: &str) -> Result<()> {
        self.send(SessionCommand::SwitchInstrument(instrument.to_string()))
            .await
    }

    pub async fn set_layout(&self, layout: Layout) -> Result<()> {
        self.send(SessionCommand::SetLayout(layout)).await
    }

    pub async fn reconnect(&self) -> Result<()> {
        self.send(SessionCommand::Reconnect).await
    }

    pub async fn close(&self) -> Result<()> {
        self.send(SessionCommand::Close).await
    }

    async fn send(&self, command: SessionCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| FeedError::ChannelClosed)
    }
}
