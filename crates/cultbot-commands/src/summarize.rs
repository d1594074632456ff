//! `/summarize`: digest recent messages of a text channel.

use std::sync::Arc;

use async_trait::async_trait;
use cultbot_core::{
    CommandHandler, CommandSpec, InboundRequest, OptionKind, OptionSpec, ReplyController, Result,
    SummaryOutcome, SummaryPipeline, TimeWindow,
};
use tracing::info;

/// Sent when the channel history could not be read.
pub const FETCH_FAILED: &str = "Error summarizing channel. Check my permissions or API status!";

pub struct SummarizeCommand {
    spec: CommandSpec,
    pipeline: Arc<SummaryPipeline>,
}

impl SummarizeCommand {
    pub fn new(pipeline: Arc<SummaryPipeline>) -> Self {
        let spec = CommandSpec::new(
            "summarize",
            "An attempt to summarize messages in a channel using AI.",
        )
        .option(
            OptionSpec::new(
                "channel",
                "The channel to summarize messages from.",
                OptionKind::Channel,
            )
            .required(),
        )
        .option(
            OptionSpec::new(
                "timeframe",
                "The timeframe to summarize (e.g., day, week, month, year)",
                OptionKind::String,
            )
            .choice("Day", "day")
            .choice("Week", "week")
            .choice("Month", "month")
            .choice("Year", "year"),
        );

        Self { spec, pipeline }
    }
}

#[async_trait]
impl CommandHandler for SummarizeCommand {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    async fn execute(&self, request: &InboundRequest, reply: &mut ReplyController) -> Result<()> {
        let channel = request.require_channel("channel")?.clone();
        let window = request
            .string("timeframe")
            .map(TimeWindow::parse)
            .unwrap_or_default();

        reply.defer().await?;

        let outcome = self
            .pipeline
            .summarize(&channel, window, request.created_at)
            .await;

        let text = match &outcome {
            SummaryOutcome::Summary(_) | SummaryOutcome::Fallback => format!(
                "Summary of {} ({}):\n{}",
                channel,
                window,
                outcome.text().unwrap_or_default()
            ),
            SummaryOutcome::NoRelevantMessages => format!(
                "No relevant messages found in {} for the specified timeframe ({}).",
                channel, window
            ),
            SummaryOutcome::FetchFailed(_) => FETCH_FAILED.to_string(),
        };
        info!(channel_id = channel.id, window = %window, "Summarize finished");

        reply.finalize(text).await
    }
}
