use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrimError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid scrim: {0}")]
    InvalidScrim(String),

    #[error("Invalid date/time '{input}': expected {expected}")]
    InvalidDateTime { input: String, expected: String },

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Unknown weekday: {0}")]
    UnknownWeekday(String),
}

impl ScrimError {
    /// Short error code string, used in logs and API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            ScrimError::Config(_) => "CONFIG_ERROR",
            ScrimError::InvalidScrim(_) => "INVALID_SCRIM",
            ScrimError::InvalidDateTime { .. } => "INVALID_DATETIME",
            ScrimError::UnknownTimezone(_) => "UNKNOWN_TIMEZONE",
            ScrimError::UnknownWeekday(_) => "UNKNOWN_WEEKDAY",
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrimError>;
