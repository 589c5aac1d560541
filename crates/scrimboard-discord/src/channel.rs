use std::sync::Arc;

use async_trait::async_trait;
use serenity::builder::{CreateMessage, EditMessage};
use serenity::http::Http;
use serenity::model::id::ChannelId;
use tracing::debug;

use scrimboard_channels::{
    BoardArtifact, ChannelError, MessageHandle, NotificationChannel, RenderedBoard,
};

use crate::embed::{board_embed, parse_message_id};

/// [`NotificationChannel`] backed by serenity's REST client.
///
/// Uses `Arc<Http>` only, so it keeps working across gateway reconnects.
pub struct DiscordChannel {
    http: Arc<Http>,
    channel_id: ChannelId,
    mention: String,
}

impl DiscordChannel {
    pub fn new(http: Arc<Http>, channel_id: u64, mention: impl Into<String>) -> Self {
        Self {
            http,
            channel_id: ChannelId::new(channel_id),
            mention: mention.into(),
        }
    }

    /// Build with a fresh REST client for `token`.
    pub fn from_token(token: &str, channel_id: u64, mention: impl Into<String>) -> Self {
        Self::new(Arc::new(Http::new(token)), channel_id, mention)
    }
}

/// Prefix `text` with the configured mention, if any.
pub fn with_mention(mention: &str, text: &str) -> String {
    let mention = mention.trim();
    if mention.is_empty() {
        text.to_string()
    } else {
        format!("{mention} {text}")
    }
}

fn is_not_found(err: &serenity::Error) -> bool {
    match err {
        serenity::Error::Http(e) => e.status_code().map(|s| s.as_u16()) == Some(404),
        _ => false,
    }
}

#[async_trait]
impl NotificationChannel for DiscordChannel {
    fn name(&self) -> &str {
        "discord"
    }

    async fn send(&self, text: &str) -> Result<MessageHandle, ChannelError> {
        let msg = self
            .channel_id
            .say(&*self.http, with_mention(&self.mention, text))
            .await
            .map_err(|e| ChannelError::SendFailed(e.to_string()))?;
        Ok(MessageHandle(msg.id.get().to_string()))
    }

    async fn delete(&self, handle: &MessageHandle) -> Result<(), ChannelError> {
        let id = parse_message_id(&handle.0)?;
        match self.channel_id.delete_message(&*self.http, id).await {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e) => {
                debug!(message = %handle, "message already gone");
                Ok(())
            }
            Err(e) => Err(ChannelError::DeleteFailed(e.to_string())),
        }
    }

    async fn fetch_board(&self, id: &str) -> Result<Option<BoardArtifact>, ChannelError> {
        let Ok(message_id) = parse_message_id(id) else {
            return Ok(None);
        };
        match self.channel_id.message(&*self.http, message_id).await {
            Ok(msg) => Ok(Some(BoardArtifact {
                id: msg.id.get().to_string(),
            })),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(ChannelError::BoardFailed(e.to_string())),
        }
    }

    async fn create_board(&self, initial: &RenderedBoard) -> Result<BoardArtifact, ChannelError> {
        let msg = self
            .channel_id
            .send_message(&*self.http, CreateMessage::new().embed(board_embed(initial)))
            .await
            .map_err(|e| ChannelError::BoardFailed(e.to_string()))?;
        Ok(BoardArtifact {
            id: msg.id.get().to_string(),
        })
    }

    async fn overwrite_board(
        &self,
        artifact: &BoardArtifact,
        body: &RenderedBoard,
    ) -> Result<(), ChannelError> {
        let id = parse_message_id(&artifact.id)?;
        self.channel_id
            .edit_message(&*self.http, id, EditMessage::new().embed(board_embed(body)))
            .await
            .map_err(|e| ChannelError::BoardFailed(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mention_is_prefixed_with_a_space() {
        assert_eq!(
            with_mention("@everyone", "Alpha starting in 30 minutes"),
            "@everyone Alpha starting in 30 minutes"
        );
    }

    #[test]
    fn blank_mention_sends_text_as_is() {
        assert_eq!(with_mention("  ", "Alpha starting in 5 minutes"), "Alpha starting in 5 minutes");
    }
}
