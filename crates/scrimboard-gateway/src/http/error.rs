use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use scrimboard_core::ScrimError;
use scrimboard_store::StoreError;

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Handler error, rendered as `(status, {"error": "..."})`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn missing_fields() -> Self {
        Self::BadRequest("Missing required fields".to_string())
    }
}

impl From<ScrimError> for ApiError {
    fn from(e: ScrimError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ScrimNotFound { .. } => Self::NotFound("Scrim not found".to_string()),
            StoreError::PlayerNotFound { .. } => Self::NotFound("Player not found".to_string()),
            StoreError::RosterSize { expected, .. } => {
                Self::BadRequest(format!("Must provide exactly {expected} players"))
            }
            StoreError::EmptyName => Self::BadRequest("Name cannot be empty".to_string()),
            StoreError::Invalid(inner) => inner.into(),
            StoreError::Database(_) | StoreError::Unavailable(_) => {
                error!(error = %e, "store failure in web handler");
                Self::Internal("internal error".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}
