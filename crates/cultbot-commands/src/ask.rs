//! `/4-1_mini`: ask a chat model a question.

use std::sync::Arc;

use async_trait::async_trait;
use cultbot_core::{
    BotError, CommandHandler, CommandSpec, InboundRequest, OptionKind, OptionSpec,
    ReplyController, Result,
};
use tracing::error;

use crate::openai::ChatModel;

/// Sent when the model could not be reached.
pub const ASK_FAILED: &str = "⚠️ Something went wrong while contacting GPT-4.1 mini.";

pub struct AskCommand {
    spec: CommandSpec,
    model: Option<Arc<dyn ChatModel>>,
}

impl AskCommand {
    /// `model` is `None` when no API key is configured.
    pub fn new(model: Option<Arc<dyn ChatModel>>) -> Self {
        let spec = CommandSpec::new(
            "4-1_mini",
            "Ask GPT-4.1 mini anything (Knowledge Cutoff Jun 01, 2024)",
        )
        .option(
            OptionSpec::new("prompt", "Your question or message", OptionKind::String).required(),
        );

        Self { spec, model }
    }
}

#[async_trait]
impl CommandHandler for AskCommand {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    async fn execute(&self, request: &InboundRequest, reply: &mut ReplyController) -> Result<()> {
        let prompt = request.require_string("prompt")?;
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| BotError::Config("OPENAI_API_KEY not set".to_string()))?;

        reply.defer().await?;

        let text = match model.complete(prompt).await {
            Ok(answer) => format!("**{}**:\n\n{}", prompt, answer),
            Err(e) => {
                error!(error = %e, "OpenAI API error");
                ASK_FAILED.to_string()
            }
        };
        reply.finalize(text).await
    }
}
