use scrimboard_core::{ScrimError, ScrimId};
use thiserror::Error;

/// Errors that can occur within the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite / rusqlite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The connection lock was poisoned by a panicking writer.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Scrim not found: {id}")]
    ScrimNotFound { id: ScrimId },

    #[error("Player not found: {id}")]
    PlayerNotFound { id: i64 },

    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Expected {expected} players, got {got}")]
    RosterSize { expected: usize, got: usize },

    /// Rejected input (bad draft, blank name, …).
    #[error(transparent)]
    Invalid(#[from] ScrimError),
}

pub type Result<T> = std::result::Result<T, StoreError>;
