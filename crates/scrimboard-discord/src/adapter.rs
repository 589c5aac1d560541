use std::sync::Arc;
use std::time::Duration;

use serenity::model::gateway::GatewayIntents;
use serenity::Client;
use tracing::{error, info, warn};

use scrimboard_core::config::DiscordConfig;

use crate::context::DiscordAppContext;
use crate::error::{DiscordError, Result};
use crate::handler::DiscordHandler;

/// Gateway side of the bot: slash commands and the edit modal.
///
/// Board updates and reminders go through [`crate::DiscordChannel`] over
/// REST and do not depend on this connection being up.
pub struct DiscordAdapter {
    app: Arc<DiscordAppContext>,
    config: DiscordConfig,
}

impl DiscordAdapter {
    pub fn new(config: &DiscordConfig, app: Arc<DiscordAppContext>) -> Result<Self> {
        if config.bot_token.trim().is_empty() {
            return Err(DiscordError::NoToken);
        }
        Ok(Self {
            app,
            config: config.clone(),
        })
    }

    /// Connect to Discord and keep reconnecting whenever the gateway drops.
    ///
    /// Never returns; runs for the lifetime of the process.
    pub async fn run(self) {
        // Interactions arrive without any privileged intents.
        let intents = GatewayIntents::GUILDS;

        loop {
            let mut client = match self.build_client(intents).await {
                Ok(c) => c,
                Err(e) => {
                    error!("Discord: connect failed ({e}), retrying in 30s");
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    continue;
                }
            };

            info!("Discord: gateway connecting");
            if let Err(e) = client.start().await {
                warn!("Discord: gateway error ({e}), reconnecting in 5s");
            } else {
                info!("Discord: gateway stopped cleanly, reconnecting in 5s");
            }
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
    }

    async fn build_client(&self, intents: GatewayIntents) -> std::result::Result<Client, serenity::Error> {
        let handler = DiscordHandler {
            app: Arc::clone(&self.app),
            config: self.config.clone(),
        };

        Client::builder(&self.config.bot_token, intents)
            .event_handler(handler)
            .await
    }
}
