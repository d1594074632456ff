//! Wiring of the dispatcher, commands and gateway client.

use std::sync::Arc;
use std::time::{Duration, Instant};

use cultbot_commands::{builtin_commands, Providers};
use cultbot_core::{BotConfig, CommandRegistry, CooldownTracker, Dispatcher};
use serenity::http::Http;
use serenity::model::gateway::GatewayIntents;
use serenity::Client;
use tokio::time::interval;
use tracing::info;

use crate::error::{DiscordError, Result};
use crate::handler::{Handler, ShardManagerContainer};
use crate::presence::PresenceConfig;
use crate::source::DiscordMessageSource;

/// How often expired cooldown entries are swept.
const COOLDOWN_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// The Discord bot.
pub struct CultBot {
    token: String,
    config: BotConfig,
    presence: PresenceConfig,
    register_commands: bool,
}

impl CultBot {
    pub fn new(token: impl Into<String>, config: BotConfig) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(DiscordError::NoToken);
        }
        Ok(Self {
            token,
            config,
            presence: PresenceConfig::default(),
            register_commands: true,
        })
    }

    pub fn with_presence(mut self, presence: PresenceConfig) -> Self {
        self.presence = presence;
        self
    }

    /// Whether to upload the slash command schemas on connect.
    pub fn with_command_registration(mut self, enabled: bool) -> Self {
        self.register_commands = enabled;
        self
    }

    /// Connect and serve until the gateway shuts down.
    pub async fn run(self) -> Result<()> {
        let http = Arc::new(Http::new(&self.token));
        let source = Arc::new(DiscordMessageSource::new(http));
        let providers = Providers::from_config(&self.config, source);

        let registry = CommandRegistry::from_handlers(builtin_commands(&self.config, providers))?;
        let specs = registry.specs();
        info!(commands = ?registry.list(), "Commands loaded");

        let cooldowns = Arc::new(CooldownTracker::new(self.config.cooldown));
        let dispatcher = Arc::new(Dispatcher::new(Arc::new(registry), cooldowns));

        tokio::spawn(purge_cooldowns_loop(dispatcher.cooldowns()));

        let intents = GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
            | GatewayIntents::GUILD_MEMBERS;
        let handler = Handler::new(dispatcher, specs, self.register_commands, self.presence);
        let mut client = Client::builder(&self.token, intents)
            .event_handler(handler)
            .await?;

        client
            .data
            .write()
            .await
            .insert::<ShardManagerContainer>(client.shard_manager.clone());

        let shard_manager = client.shard_manager.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received, stopping Discord client");
            shard_manager.shutdown_all().await;
        });

        info!("Starting Discord gateway connection");
        client.start().await?;
        info!("Discord bot stopped");
        Ok(())
    }
}

async fn purge_cooldowns_loop(cooldowns: Arc<CooldownTracker>) {
    let mut purge_interval = interval(COOLDOWN_PURGE_INTERVAL);
    loop {
        purge_interval.tick().await;
        cooldowns.purge_expired(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_token_rejected() {
        assert!(matches!(
            CultBot::new("  ", BotConfig::default()),
            Err(DiscordError::NoToken)
        ));
    }

    #[test]
    fn test_builder() {
        let bot = CultBot::new("token", BotConfig::default())
            .unwrap()
            .with_command_registration(false);
        assert!(!bot.register_commands);
    }
}
