use async_trait::async_trait;

use crate::{
    error::ChannelError,
    types::{BoardArtifact, MessageHandle, RenderedBoard},
};

/// Outbound side of the chat platform, as seen by the reminder loop.
///
/// Implementations must be `Send + Sync` so the loop can hold one behind an
/// `Arc` and other tasks (slash commands, the web API) can share it.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Stable lowercase identifier for logs (e.g. `"discord"`).
    fn name(&self) -> &str;

    /// Post a plain text message and return a handle that can delete it.
    async fn send(&self, text: &str) -> Result<MessageHandle, ChannelError>;

    /// Remove a previously sent message.
    ///
    /// Idempotent: a message that is already gone (or was never known) is
    /// reported as `Ok`. Errors are reserved for failures worth logging.
    async fn delete(&self, handle: &MessageHandle) -> Result<(), ChannelError>;

    /// Look up the board by its persisted id. `Ok(None)` means it no longer exists.
    async fn fetch_board(&self, id: &str) -> Result<Option<BoardArtifact>, ChannelError>;

    /// Post a new board with `initial` as its body.
    async fn create_board(&self, initial: &RenderedBoard) -> Result<BoardArtifact, ChannelError>;

    /// Replace the whole body of an existing board.
    async fn overwrite_board(
        &self,
        artifact: &BoardArtifact,
        body: &RenderedBoard,
    ) -> Result<(), ChannelError>;
}
