use scrimboard_core::ScrimError;
use scrimboard_store::StoreError;

/// Errors produced by the Discord adapter and slash command handlers.
#[derive(Debug, thiserror::Error)]
pub enum DiscordError {
    #[error("serenity error: {0}")]
    Serenity(#[from] serenity::Error),

    #[error("no bot token configured")]
    NoToken,

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Input(#[from] ScrimError),
}

pub type Result<T> = std::result::Result<T, DiscordError>;
