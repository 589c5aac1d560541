//! Player availability grid.
//!
//! Slots are keyed by a full local day label (`"Monday 22/12/2025"`) and a
//! free-form time string. The form posts a weekday name plus a week offset
//! from the current local week.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use scrimboard_core::time::{day_label, week_day_label};
use scrimboard_core::SlotStatus;
use scrimboard_store::Schedule;

use crate::app::AppState;
use crate::http::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct PlayerQuery {
    pub player_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct SlotForm {
    pub player_id: Option<i64>,
    pub day: Option<String>,
    pub time: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub week_offset: i64,
}

/// GET /api/availability?player_id=N
pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Query(q): Query<PlayerQuery>,
) -> ApiResult<Json<Schedule>> {
    Ok(Json(state.store.availability_for_player(q.player_id)?))
}

/// POST /api/availability
pub async fn set_availability(
    State(state): State<Arc<AppState>>,
    Json(form): Json<SlotForm>,
) -> ApiResult<Json<Value>> {
    let (Some(player_id), Some(day), Some(time), Some(status)) =
        (form.player_id, form.day, form.time, form.status)
    else {
        return Err(ApiError::missing_fields());
    };
    if day.trim().is_empty() || time.trim().is_empty() || status.trim().is_empty() {
        return Err(ApiError::missing_fields());
    }

    let today = Utc::now().with_timezone(&state.tz).date_naive();
    let label = week_day_label(today, &day, form.week_offset)?;
    state
        .store
        .set_availability(player_id, &label, time.trim(), &SlotStatus::parse(&status))?;
    Ok(Json(json!({ "success": true })))
}

/// GET /api/availability_all?date=YYYY-MM-DD
///
/// `{player_id: {day_label: {time: status}}}` for that one day; players with
/// nothing filled in map to `{}`.
pub async fn get_availability_all(
    State(state): State<Arc<AppState>>,
    Query(q): Query<DateQuery>,
) -> ApiResult<Json<BTreeMap<i64, Schedule>>> {
    let date = NaiveDate::parse_from_str(q.date.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("invalid date {:?}, expected YYYY-MM-DD", q.date)))?;
    let label = day_label(date);

    let by_player = state
        .store
        .availability_for_day(&label)?
        .into_iter()
        .map(|(player_id, slots)| {
            let mut schedule = Schedule::new();
            if !slots.is_empty() {
                schedule.insert(label.clone(), slots);
            }
            (player_id, schedule)
        })
        .collect();
    Ok(Json(by_player))
}
