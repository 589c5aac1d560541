//! Shared state handed to the serenity event handler.

use std::sync::Arc;

use chrono_tz::Tz;
use tokio::sync::mpsc;
use tracing::warn;

use scrimboard_core::BoardRefresh;
use scrimboard_store::ScrimStore;

pub struct DiscordAppContext {
    pub store: Arc<ScrimStore>,
    /// Zone slash command and modal input is interpreted in.
    pub tz: Tz,
    refresh_tx: mpsc::Sender<BoardRefresh>,
}

impl DiscordAppContext {
    pub fn new(store: Arc<ScrimStore>, tz: Tz, refresh_tx: mpsc::Sender<BoardRefresh>) -> Self {
        Self {
            store,
            tz,
            refresh_tx,
        }
    }

    /// Ask the reminder loop to republish the board. Never blocks; when the
    /// queue is full a refresh is already pending.
    pub fn request_refresh(&self, reason: &'static str) {
        if let Err(e) = self.refresh_tx.try_send(BoardRefresh::new(reason)) {
            warn!(reason, "board refresh not queued: {e}");
        }
    }
}
