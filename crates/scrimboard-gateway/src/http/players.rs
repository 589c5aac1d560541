use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use scrimboard_core::Player;

use crate::app::AppState;
use crate::http::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct RosterForm {
    pub players: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenameForm {
    pub id: Option<i64>,
    pub name: Option<String>,
}

/// GET /api/players
pub async fn list_players(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Player>>> {
    Ok(Json(state.store.list_players()?))
}

/// POST /api/players: replace every roster name at once.
pub async fn set_players(
    State(state): State<Arc<AppState>>,
    Json(form): Json<RosterForm>,
) -> ApiResult<Json<Value>> {
    state.store.set_players(&form.players)?;
    Ok(Json(json!({ "success": true })))
}

/// POST /api/player: rename one slot.
pub async fn rename_player(
    State(state): State<Arc<AppState>>,
    Json(form): Json<RenameForm>,
) -> ApiResult<Json<Value>> {
    let (Some(id), Some(name)) = (form.id, form.name) else {
        return Err(ApiError::BadRequest("Invalid request".to_string()));
    };
    state.store.rename_player(id, &name)?;
    Ok(Json(json!({ "success": true })))
}
