//! Cultbot Core - interaction dispatch and channel summarization.
//!
//! This crate holds everything that does not depend on a chat platform:
//!
//! - **request**: Inbound interaction model
//! - **cooldown**: Per-user rate limiting
//! - **reply**: Two-phase acknowledge/defer/finalize protocol
//! - **command** / **registry**: Handler trait and lookup table
//! - **dispatcher**: Single entry point with uniform failure recovery
//! - **summarizer**: Bounded fetch → filter → summarize pipeline
//! - **huggingface**: Remote summarizer client
//! - **config**: Environment-driven configuration

pub mod command;
pub mod config;
pub mod cooldown;
pub mod dedup;
pub mod dispatcher;
pub mod error;
pub mod huggingface;
pub mod registry;
pub mod reply;
pub mod request;
pub mod summarizer;

#[cfg(any(test, feature = "test-support"))]
pub mod mocks;

pub use command::{CommandHandler, CommandSpec, OptionChoice, OptionKind, OptionSpec};
pub use config::{config_dir, env_file, BotConfig};
pub use cooldown::{Cooldown, CooldownTracker};
pub use dedup::DedupGuard;
pub use dispatcher::{DispatchOutcome, Dispatcher, GENERIC_FAILURE};
pub use error::{BotError, Result};
pub use huggingface::HuggingFaceSummarizer;
pub use registry::CommandRegistry;
pub use reply::{Attachment, InteractionResponder, Reply, ReplyController, ReplyState};
pub use request::{ChannelRef, InboundEvent, InboundRequest, OptionValue};
pub use summarizer::{
    ChannelMessage, MessageSource, Summarizer, SummaryConfig, SummaryOutcome, SummaryPipeline,
    TimeWindow, FALLBACK_SUMMARY,
};
