use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use chrono_tz::Tz;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use scrimboard_core::{BoardRefresh, ScrimConfig};
use scrimboard_store::ScrimStore;

use crate::http;

/// Shared state, passed as `Arc<AppState>` to all Axum handlers.
pub struct AppState {
    pub config: ScrimConfig,
    pub store: Arc<ScrimStore>,
    /// Zone web form input is interpreted in.
    pub tz: Tz,
    refresh_tx: mpsc::Sender<BoardRefresh>,
}

impl AppState {
    pub fn new(
        config: ScrimConfig,
        store: Arc<ScrimStore>,
        tz: Tz,
        refresh_tx: mpsc::Sender<BoardRefresh>,
    ) -> Self {
        Self {
            config,
            store,
            tz,
            refresh_tx,
        }
    }

    /// Ask the reminder loop to republish the board after a write.
    pub fn request_refresh(&self, reason: &'static str) {
        match self.refresh_tx.try_send(BoardRefresh::new(reason)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => debug!(reason, "board refresh already pending"),
            // No reminder loop running (Discord not configured).
            Err(TrySendError::Closed(_)) => warn!(reason, "board refresh dropped, no board configured"),
        }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(http::health::health_handler))
        .route("/api/scrims", get(http::scrims::list_scrims))
        .route("/add", post(http::scrims::add_scrim))
        .route("/edit", post(http::scrims::edit_scrim))
        .route("/delete", post(http::scrims::delete_scrim))
        .route(
            "/api/availability",
            get(http::availability::get_availability).post(http::availability::set_availability),
        )
        .route(
            "/api/availability_all",
            get(http::availability::get_availability_all),
        )
        .route(
            "/api/players",
            get(http::players::list_players).post(http::players::set_players),
        )
        .route("/api/player", post(http::players::rename_player))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
