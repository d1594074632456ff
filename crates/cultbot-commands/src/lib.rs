//! Cultbot Commands - the slash commands the bot serves.
//!
//! Each command is one [`CommandHandler`]. [`builtin_commands`] is the
//! static list the registry is built from at startup.

pub mod ask;
pub mod days_until;
pub mod help;
pub mod image;
pub mod openai;
pub mod ping;
pub mod summarize;
pub mod vertex;

use std::sync::Arc;

use cultbot_core::{
    BotConfig, CommandHandler, CommandSpec, HuggingFaceSummarizer, MessageSource, SummaryPipeline,
};
use tracing::warn;

pub use ask::AskCommand;
pub use days_until::{days_until_july_17, DaysUntilCommand};
pub use help::HelpCommand;
pub use image::ImageCommand;
pub use openai::{ChatModel, OpenAiClient};
pub use ping::PingCommand;
pub use summarize::SummarizeCommand;
pub use vertex::{GeneratedImage, ImageModel, ImagenClient};

/// External models the commands call.
pub struct Providers {
    pub source: Arc<dyn MessageSource>,
    pub summarizer: Arc<dyn cultbot_core::Summarizer>,
    pub chat: Option<Arc<dyn ChatModel>>,
    pub image: Option<Arc<dyn ImageModel>>,
}

impl Providers {
    /// Real clients built from config. Providers without credentials are left out.
    pub fn from_config(config: &BotConfig, source: Arc<dyn MessageSource>) -> Self {
        if config.huggingface_api_key.is_none() {
            warn!("HUGGINGFACE_API_KEY not set, summaries will likely fall back");
        }
        let summarizer = Arc::new(HuggingFaceSummarizer::new(
            config.summarizer_url.clone(),
            config.huggingface_api_key.clone(),
        ));

        let chat = config.openai_api_key.as_ref().map(|key| {
            Arc::new(OpenAiClient::new(
                key.clone(),
                config.openai_model.clone(),
                config.provider_timeout,
            )) as Arc<dyn ChatModel>
        });
        if chat.is_none() {
            warn!("OPENAI_API_KEY not set, /4-1_mini will fail");
        }

        let image = match (&config.vertex_project_id, &config.google_access_token) {
            (Some(project), Some(token)) => Some(Arc::new(ImagenClient::new(
                project.clone(),
                config.vertex_location.clone(),
                token.clone(),
                config.provider_timeout,
            )) as Arc<dyn ImageModel>),
            _ => {
                warn!("PROJECT_ID or GOOGLE_ACCESS_TOKEN not set, /image will fail");
                None
            }
        };

        Self {
            source,
            summarizer,
            chat,
            image,
        }
    }
}

/// The full command list, `/commands` last so it can describe the rest.
pub fn builtin_commands(config: &BotConfig, providers: Providers) -> Vec<Arc<dyn CommandHandler>> {
    let pipeline = Arc::new(SummaryPipeline::new(
        providers.source,
        providers.summarizer,
        config.summary.clone(),
    ));

    let mut commands: Vec<Arc<dyn CommandHandler>> = vec![
        Arc::new(SummarizeCommand::new(pipeline)),
        Arc::new(AskCommand::new(providers.chat)),
        Arc::new(ImageCommand::new(providers.image)),
        Arc::new(PingCommand::new()),
        Arc::new(DaysUntilCommand::new()),
    ];

    let specs: Vec<CommandSpec> = commands.iter().map(|c| c.spec().clone()).collect();
    commands.push(Arc::new(HelpCommand::new(&specs)));
    commands
}
