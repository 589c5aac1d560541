use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use scrimboard_channels::{BoardArtifact, MessageHandle, NotificationChannel};
use scrimboard_core::{Scrim, ScrimId};
use scrimboard_store::EventSource;

use crate::{
    error::Result,
    reminder::{minutes_until, reminder_text, within_window, ReminderState},
    render::{placeholder_board, BoardRenderer},
};

/// Outcome of one tick, for logging and tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub pruned: usize,
    pub active: usize,
    pub board_published: bool,
    pub sent: usize,
    pub retracted: usize,
    pub failures: usize,
}

/// One pass of the reminder loop: prune, republish the board, then post and
/// retract threshold reminders.
///
/// Owns the [`ReminderState`]; nothing else mutates it.
pub struct Reconciler {
    store: Arc<dyn EventSource>,
    channel: Arc<dyn NotificationChannel>,
    renderer: BoardRenderer,
    /// Sorted largest first, no duplicates.
    thresholds: Vec<u32>,
    state: ReminderState,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn EventSource>,
        channel: Arc<dyn NotificationChannel>,
        renderer: BoardRenderer,
        thresholds: &[u32],
    ) -> Self {
        let mut thresholds = thresholds.to_vec();
        thresholds.sort_unstable_by(|a, b| b.cmp(a));
        thresholds.dedup();
        Self {
            store,
            channel,
            renderer,
            thresholds,
            state: ReminderState::new(),
        }
    }

    pub fn state(&self) -> &ReminderState {
        &self.state
    }

    pub fn thresholds(&self) -> &[u32] {
        &self.thresholds
    }

    /// Run a full tick at `now`. Only store failures abort the tick; every
    /// channel failure is logged and counted in the report.
    pub async fn tick(&mut self, now: DateTime<Utc>) -> Result<TickReport> {
        let mut report = TickReport {
            pruned: self.store.prune_expired(now)?,
            ..TickReport::default()
        };
        if report.pruned > 0 {
            info!(count = report.pruned, "pruned expired scrims");
        }

        let scrims = self.store.list_active(now)?;
        report.active = scrims.len();

        match self.publish_board(&scrims, now).await {
            Ok(()) => report.board_published = true,
            Err(e) => {
                report.failures += 1;
                error!(channel = self.channel.name(), "board publish failed: {e}");
            }
        }

        let active: HashSet<ScrimId> = scrims.iter().map(|s| s.id).collect();
        for (id, threshold, handle) in self.state.take_orphans(&active) {
            debug!(scrim_id = %id, threshold, "retracting reminder for removed scrim");
            self.retract(&handle, &mut report).await;
        }

        for scrim in &scrims {
            self.evaluate(scrim, now, &mut report).await;
        }

        Ok(report)
    }

    /// Republish the board without pruning or reminder evaluation.
    pub async fn refresh_board(&self, now: DateTime<Utc>) -> Result<()> {
        let scrims = self.store.list_active(now)?;
        self.publish_board(&scrims, now).await
    }

    async fn publish_board(&self, scrims: &[Scrim], now: DateTime<Utc>) -> Result<()> {
        let body = self.renderer.render(scrims, now)?;
        let artifact = self.board_artifact().await?;
        self.channel.overwrite_board(&artifact, &body).await?;
        debug!(board_id = %artifact.id, scrims = scrims.len(), "board published");
        Ok(())
    }

    /// Fetch the persisted board, or create and persist a fresh one.
    async fn board_artifact(&self) -> Result<BoardArtifact> {
        if let Some(id) = self.store.board_identity()? {
            match self.channel.fetch_board(&id).await {
                Ok(Some(artifact)) => return Ok(artifact),
                Ok(None) => info!(board_id = %id, "board message gone, creating a new one"),
                Err(e) => warn!(board_id = %id, "board fetch failed, creating a new one: {e}"),
            }
        }

        let artifact = self.channel.create_board(&placeholder_board()).await?;
        self.store.set_board_identity(&artifact.id)?;
        info!(board_id = %artifact.id, "board message created");
        Ok(artifact)
    }

    async fn evaluate(&mut self, scrim: &Scrim, now: DateTime<Utc>, report: &mut TickReport) {
        let diff = minutes_until(scrim.start, now);

        if diff <= 0.0 {
            for (threshold, handle) in self.state.take_event(scrim.id) {
                debug!(scrim_id = %scrim.id, threshold, "scrim started, retracting reminder");
                self.retract(&handle, report).await;
            }
            return;
        }

        for &threshold in &self.thresholds {
            if !within_window(diff, threshold) || self.state.contains(scrim.id, threshold) {
                continue;
            }

            let text = reminder_text(&scrim.name, diff);
            match self.channel.send(&text).await {
                Ok(handle) => {
                    info!(scrim_id = %scrim.id, threshold, "reminder sent");
                    report.sent += 1;
                    self.state.insert(scrim.id, threshold, handle);
                    for (old, handle) in self.state.take_superseded(scrim.id, threshold) {
                        debug!(scrim_id = %scrim.id, threshold = old, "retracting superseded reminder");
                        self.retract(&handle, report).await;
                    }
                }
                Err(e) => {
                    report.failures += 1;
                    warn!(scrim_id = %scrim.id, threshold, "reminder send failed: {e}");
                }
            }
        }
    }

    async fn retract(&self, handle: &MessageHandle, report: &mut TickReport) {
        match self.channel.delete(handle).await {
            Ok(()) => report.retracted += 1,
            Err(e) => {
                report.failures += 1;
                warn!(message = %handle, "reminder delete failed: {e}");
            }
        }
    }
}
