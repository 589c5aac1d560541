use scrimboard_channels::ChannelError;
use scrimboard_store::StoreError;
use thiserror::Error;

/// Errors produced while building a board body.
#[derive(Debug, Error)]
pub enum BoardError {
    /// Discord embeds carry at most 25 fields; nothing partial is produced.
    #[error("Board needs {count} fields (max {max})")]
    TooManyFields { count: usize, max: usize },
}

/// Errors that can occur within the reminder loop.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The store could not be read or written; the current tick is abandoned.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The chat platform rejected a board operation.
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Render error: {0}")]
    Board(#[from] BoardError),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
