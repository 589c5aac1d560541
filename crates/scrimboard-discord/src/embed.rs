//! `RenderedBoard` → serenity embed.

use serenity::builder::CreateEmbed;
use serenity::model::id::MessageId;

use scrimboard_channels::{ChannelError, RenderedBoard};

/// Board accent colour (green).
pub const BOARD_COLOUR: u32 = 0x2ecc71;

pub fn board_embed(board: &RenderedBoard) -> CreateEmbed {
    let mut e = CreateEmbed::new()
        .title(&board.title)
        .description(&board.description)
        .colour(BOARD_COLOUR);
    for field in &board.fields {
        e = e.field(&field.name, &field.value, false);
    }
    e
}

/// Parse a persisted board/reminder id back into a Discord message id.
pub fn parse_message_id(raw: &str) -> Result<MessageId, ChannelError> {
    match raw.trim().parse::<u64>() {
        Ok(n) if n != 0 => Ok(MessageId::new(n)),
        _ => Err(ChannelError::InvalidHandle(raw.to_string())),
    }
}
