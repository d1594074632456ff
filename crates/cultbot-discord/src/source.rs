//! Channel history over the Discord REST API.

use std::sync::Arc;

use async_trait::async_trait;
use cultbot_core::config::MAX_FETCH_LIMIT;
use cultbot_core::{BotError, ChannelMessage, ChannelRef, MessageSource, Result};
use serenity::builder::GetMessages;
use serenity::http::Http;
use serenity::model::channel::Message;
use serenity::model::id::ChannelId;
use tracing::debug;

use crate::convert::to_utc;


/// Reads recent messages with the bot's HTTP client.
pub struct DiscordMessageSource {
    http: Arc<Http>,
}

impl DiscordMessageSource {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

fn to_channel_message(message: &Message) -> ChannelMessage {
    ChannelMessage::new(
        message.author.bot,
        message.content.clone(),
        to_utc(message.timestamp),
    )
}

#[async_trait]
impl MessageSource for DiscordMessageSource {
    async fn fetch_recent_messages(
        &self,
        channel: &ChannelRef,
        limit: usize,
    ) -> Result<Vec<ChannelMessage>> {
        let page = limit.clamp(1, MAX_FETCH_LIMIT) as u8;
        let messages = ChannelId::new(channel.id)
            .messages(&self.http, GetMessages::new().limit(page))
            .await
            .map_err(|e| BotError::Transport(e.to_string()))?;

        debug!(channel_id = channel.id, count = messages.len(), "Fetched channel history");
        Ok(messages.iter().map(to_channel_message).collect())
    }
}
