use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use scrimboard_core::BoardRefresh;

use crate::reconcile::Reconciler;

/// Drives a [`Reconciler`] on a fixed period until shutdown.
///
/// Board refresh requests (after an add/edit/delete elsewhere) are served
/// from the same `select!` loop, so they never overlap a tick.
pub struct ReminderEngine {
    reconciler: Reconciler,
    period: Duration,
    refresh_rx: Option<mpsc::Receiver<BoardRefresh>>,
}

impl ReminderEngine {
    pub fn new(reconciler: Reconciler, period: Duration) -> Self {
        Self {
            reconciler,
            period,
            refresh_rx: None,
        }
    }

    pub fn with_refresh(mut self, rx: mpsc::Receiver<BoardRefresh>) -> Self {
        self.refresh_rx = Some(rx);
        self
    }

    /// Main loop. The first tick runs immediately; errors are logged and the
    /// loop carries on until `shutdown` broadcasts `true`.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let Self {
            mut reconciler,
            period,
            mut refresh_rx,
        } = self;
        let mut refresh_open = refresh_rx.is_some();

        info!(
            period_secs = period.as_secs(),
            thresholds = ?reconciler.thresholds(),
            "reminder engine started"
        );
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match reconciler.tick(Utc::now()).await {
                        Ok(report) => debug!(?report, "tick complete"),
                        Err(e) => error!("reminder tick error: {e}"),
                    }
                }
                req = next_refresh(&mut refresh_rx), if refresh_open => {
                    match req {
                        Some(req) => {
                            if let Err(e) = reconciler.refresh_board(Utc::now()).await {
                                error!(reason = req.reason, "board refresh failed: {e}");
                            }
                        }
                        None => refresh_open = false,
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("reminder engine shutting down");
                        break;
                    }
                }
            }
        }
    }
}

async fn next_refresh(rx: &mut Option<mpsc::Receiver<BoardRefresh>>) -> Option<BoardRefresh> {
    match rx {
        Some(rx) => rx.recv().await,
        None => None,
    }
}
