use thiserror::Error;

/// Errors that can occur within any notification channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// A message could not be delivered to the remote endpoint.
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// A message could not be removed.
    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    /// The board message could not be fetched, created or edited.
    #[error("Board update failed: {0}")]
    BoardFailed(String),

    /// A handle or artifact id that this channel cannot interpret.
    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    /// The channel-specific configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
