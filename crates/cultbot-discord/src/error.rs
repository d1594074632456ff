//! Error types for the Discord adapter.

use thiserror::Error;

/// Errors that can occur while starting or running the bot.
#[derive(Debug, Error)]
pub enum DiscordError {
    /// Bot token not provided.
    #[error("Discord bot token not set. Set BOT_TOKEN environment variable.")]
    NoToken,

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The command list is inconsistent.
    #[error("Command registry error: {0}")]
    Registry(String),

    /// Gateway or REST failure.
    #[error("Discord error: {0}")]
    Serenity(#[from] serenity::Error),
}

/// Result type for adapter operations.
pub type Result<T> = std::result::Result<T, DiscordError>;

impl From<cultbot_core::BotError> for DiscordError {
    fn from(e: cultbot_core::BotError) -> Self {
        match e {
            cultbot_core::BotError::Config(msg) => DiscordError::Config(msg),
            other => DiscordError::Registry(other.to_string()),
        }
    }
}
