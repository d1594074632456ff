//! `/image`: generate a picture from a prompt.

use std::sync::Arc;

use async_trait::async_trait;
use cultbot_core::{
    BotError, CommandHandler, CommandSpec, InboundRequest, OptionKind, OptionSpec, Reply,
    ReplyController, Result,
};
use tracing::{error, info};

use crate::vertex::{GeneratedImage, ImageModel};

pub const NO_IMAGE: &str = "⚠️ No image generated. Try a different prompt.";
pub const NO_IMAGE_DATA: &str = "⚠️ No image data found in the response.";

/// File name of the attachment.
pub const IMAGE_FILENAME: &str = "generated.png";

pub struct ImageCommand {
    spec: CommandSpec,
    model: Option<Arc<dyn ImageModel>>,
}

impl ImageCommand {
    /// `model` is `None` when Vertex AI is not configured.
    pub fn new(model: Option<Arc<dyn ImageModel>>) -> Self {
        let spec = CommandSpec::new(
            "image",
            "Generate an AI image from a prompt (Google Cloud Vertex AI Imagen)",
        )
        .option(
            OptionSpec::new(
                "prompt",
                "Describe the image you want to generate",
                OptionKind::String,
            )
            .required(),
        );

        Self { spec, model }
    }
}

#[async_trait]
impl CommandHandler for ImageCommand {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    async fn execute(&self, request: &InboundRequest, reply: &mut ReplyController) -> Result<()> {
        let prompt = request.require_string("prompt")?;
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| BotError::Config("PROJECT_ID or GOOGLE_ACCESS_TOKEN not set".to_string()))?;

        reply.defer().await?;

        let result = match model.generate(prompt).await {
            Ok(GeneratedImage::Image(bytes)) => {
                info!(bytes = bytes.len(), "Image generated");
                Reply::text(format!("Here’s your AI image for: **{}**", prompt))
                    .with_attachment(IMAGE_FILENAME, bytes)
            }
            Ok(GeneratedImage::NoPredictions) => Reply::text(NO_IMAGE),
            Ok(GeneratedImage::NoImageData) => Reply::text(NO_IMAGE_DATA),
            Err(e) => {
                error!(error = %e, "Image generation error");
                Reply::text(format!("❌ Error while generating image:\n```{}```", e))
            }
        };
        reply.finalize(result).await
    }
}
