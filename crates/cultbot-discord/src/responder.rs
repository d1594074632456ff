//! Reply primitives over the Discord interaction endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use cultbot_core::{BotError, InteractionResponder, Reply, Result};
use serenity::builder::{
    CreateAttachment, CreateInteractionResponse, CreateInteractionResponseMessage,
    EditInteractionResponse,
};
use serenity::http::Http;
use serenity::model::application::CommandInteraction;

/// Discord's per-message content limit, in characters.
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// Cut `content` to what Discord will accept.
pub fn clamp_content(content: &str) -> &str {
    match content.char_indices().nth(MAX_MESSAGE_CHARS) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}

fn attachments(reply: &Reply) -> Vec<CreateAttachment> {
    reply
        .attachments
        .iter()
        .map(|a| CreateAttachment::bytes(a.data.clone(), a.filename.clone()))
        .collect()
}

fn transport(e: serenity::Error) -> BotError {
    BotError::Transport(e.to_string())
}

/// Answers one command interaction.
pub struct DiscordResponder {
    http: Arc<Http>,
    interaction: CommandInteraction,
}

impl DiscordResponder {
    pub fn new(http: Arc<Http>, interaction: CommandInteraction) -> Self {
        Self { http, interaction }
    }
}

#[async_trait]
impl InteractionResponder for DiscordResponder {
    async fn send_acknowledgment(&self, reply: &Reply) -> Result<()> {
        let message = CreateInteractionResponseMessage::new()
            .content(clamp_content(&reply.content))
            .ephemeral(reply.ephemeral)
            .files(attachments(reply));

        self.interaction
            .create_response(&self.http, CreateInteractionResponse::Message(message))
            .await
            .map_err(transport)
    }

    async fn send_deferred_placeholder(&self) -> Result<()> {
        self.interaction
            .create_response(
                &self.http,
                CreateInteractionResponse::Defer(CreateInteractionResponseMessage::new()),
            )
            .await
            .map_err(transport)
    }

    async fn edit_deferred_reply(&self, reply: &Reply) -> Result<()> {
        // Visibility is fixed by the placeholder.
        let mut edit = EditInteractionResponse::new().content(clamp_content(&reply.content));
        for attachment in attachments(reply) {
            edit = edit.new_attachment(attachment);
        }

        self.interaction
            .edit_response(&self.http, edit)
            .await
            .map(|_| ())
            .map_err(transport)
    }
}
