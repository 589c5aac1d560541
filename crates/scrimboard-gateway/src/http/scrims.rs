//! Scrim CRUD for the web front end.
//!
//! Writes take local wall-clock input (`date` = `YYYY-MM-DD`, times `HH:MM`)
//! in the configured timezone and queue a board refresh on success.

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use scrimboard_core::time::{day_label, parse_form_datetime};
use scrimboard_core::{Scrim, ScrimDraft, ScrimId};

use crate::app::AppState;
use crate::http::error::{ApiError, ApiResult};

#[derive(Debug, Default, Deserialize)]
pub struct ScrimForm {
    pub scrim_id: Option<i64>,
    pub name: Option<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub contact: Option<String>,
    pub note: Option<String>,
}

impl ScrimForm {
    fn draft(&self, tz: Tz) -> ApiResult<ScrimDraft> {
        let required = |v: &Option<String>| -> ApiResult<String> {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .ok_or_else(ApiError::missing_fields)
        };
        let name = required(&self.name)?;
        let date = required(&self.date)?;
        let start = parse_form_datetime(&date, &required(&self.start_time)?, tz)?;
        let end = parse_form_datetime(&date, &required(&self.end_time)?, tz)?;
        Ok(ScrimDraft::new(
            &name,
            start,
            end,
            self.contact.as_deref(),
            self.note.as_deref(),
        )?)
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    pub scrim_id: Option<i64>,
}

/// One scrim as the web page shows it, in local time.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ScrimView {
    pub id: ScrimId,
    pub name: String,
    pub time_display: String,
    pub date_iso: String,
    pub start_iso: String,
    pub end_iso: String,
    pub contact: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DayGroup {
    pub day: String,
    pub scrims: Vec<ScrimView>,
}

fn success() -> Json<Value> {
    Json(json!({ "success": true }))
}

/// Group scrims by local day, earliest day first. Input must be start-ordered.
pub fn group_by_day(scrims: &[Scrim], tz: Tz) -> Vec<DayGroup> {
    let mut groups: Vec<DayGroup> = Vec::new();
    for scrim in scrims {
        let start = scrim.start.with_timezone(&tz);
        let end = scrim.end.with_timezone(&tz);
        let day = day_label(start.date_naive());
        let view = ScrimView {
            id: scrim.id,
            name: scrim.name.clone(),
            time_display: format!("{} → {}", start.format("%I:%M %p"), end.format("%I:%M %p")),
            date_iso: start.format("%Y-%m-%d").to_string(),
            start_iso: start.format("%H:%M").to_string(),
            end_iso: end.format("%H:%M").to_string(),
            contact: scrim.contact.clone(),
            note: scrim.note.clone(),
        };
        match groups.last_mut() {
            Some(g) if g.day == day => g.scrims.push(view),
            _ => groups.push(DayGroup {
                day,
                scrims: vec![view],
            }),
        }
    }
    groups
}

/// GET /api/scrims
pub async fn list_scrims(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<DayGroup>>> {
    let scrims = state.store.list_all()?;
    Ok(Json(group_by_day(&scrims, state.tz)))
}

/// POST /add
pub async fn add_scrim(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ScrimForm>,
) -> ApiResult<Json<Value>> {
    let draft = form.draft(state.tz)?;
    let scrim = state.store.add_scrim(&draft)?;
    info!(scrim_id = %scrim.id, name = %scrim.name, "scrim added via web");
    state.request_refresh("web add");
    Ok(success())
}

/// POST /edit
pub async fn edit_scrim(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ScrimForm>,
) -> ApiResult<Json<Value>> {
    let id = form.scrim_id.ok_or_else(ApiError::missing_fields)?;
    let draft = form.draft(state.tz)?;
    state.store.update_scrim(ScrimId(id), &draft)?;
    info!(scrim_id = id, "scrim edited via web");
    state.request_refresh("web edit");
    Ok(success())
}

/// POST /delete
pub async fn delete_scrim(
    State(state): State<Arc<AppState>>,
    Json(form): Json<DeleteForm>,
) -> ApiResult<Json<Value>> {
    let id = form
        .scrim_id
        .ok_or_else(|| ApiError::BadRequest("scrim_id is required".to_string()))?;
    state.store.delete_scrim(ScrimId(id))?;
    info!(scrim_id = id, "scrim deleted via web");
    state.request_refresh("web delete");
    Ok(success())
}
