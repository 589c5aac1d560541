use std::sync::Arc;

use serenity::async_trait;
use serenity::model::application::Interaction;
use serenity::model::gateway::Ready;
use serenity::model::id::GuildId;
use serenity::prelude::{Context, EventHandler};
use tracing::info;

use scrimboard_core::config::DiscordConfig;

use crate::commands;
use crate::context::DiscordAppContext;

/// Serenity event handler wired to the scrim store.
pub struct DiscordHandler {
    pub app: Arc<DiscordAppContext>,
    pub config: DiscordConfig,
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(name = %ready.user.name, "Discord bot connected");

        if self.config.slash_commands {
            commands::register_commands(&ctx, self.config.guild_id.map(GuildId::new)).await;
        }

        // Republish without waiting for the next tick.
        self.app.request_refresh("discord ready");
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if !self.config.slash_commands {
            return;
        }
        match interaction {
            Interaction::Command(command) => {
                commands::handle_interaction(&self.app, &ctx, &command).await;
            }
            Interaction::Modal(modal) => {
                commands::handle_modal(&self.app, &ctx, &modal).await;
            }
            _ => {}
        }
    }
}
