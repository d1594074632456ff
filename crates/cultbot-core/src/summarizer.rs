//! Bounded channel summarization.
//!
//! Fetches recent channel history, keeps recent human messages, and asks a
//! remote summarizer for a digest. Every stage is bounded and every failure
//! past the fetch degrades to [`SummaryOutcome::Fallback`] instead of an
//! error.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::{BotError, Result};
use crate::request::ChannelRef;

/// Text used when the remote summarizer gives no usable answer.
pub const FALLBACK_SUMMARY: &str = "Unable to generate summary.";

/// One message from a channel's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMessage {
    pub author_is_bot: bool,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChannelMessage {
    pub fn new(author_is_bot: bool, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            author_is_bot,
            content: content.into(),
            timestamp,
        }
    }
}

/// Read access to channel history.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Up to `limit` most recent messages, newest first.
    async fn fetch_recent_messages(
        &self,
        channel: &ChannelRef,
        limit: usize,
    ) -> Result<Vec<ChannelMessage>>;
}

/// A remote text summarizer.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, inputs: &str) -> Result<String>;
}

/// Limits for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryConfig {
    /// Messages requested from the channel.
    pub fetch_limit: usize,
    pub fetch_timeout: Duration,
    pub summarize_timeout: Duration,
    /// Payload cap, in characters.
    pub max_input_chars: usize,
    /// Messages with this many characters or fewer are dropped.
    pub min_content_chars: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            fetch_limit: 100,
            fetch_timeout: Duration::from_secs(5),
            summarize_timeout: Duration::from_secs(10),
            max_input_chars: 1100,
            min_content_chars: 5,
        }
    }
}

/// How far back a summary looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeWindow {
    #[default]
    Day,
    Week,
    Month,
    Year,
}

impl TimeWindow {
    /// Parse a window name. Unknown names fall back to [`TimeWindow::Day`].
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => TimeWindow::Week,
            "month" => TimeWindow::Month,
            "year" => TimeWindow::Year,
            _ => TimeWindow::Day,
        }
    }

    pub fn duration(self) -> chrono::Duration {
        match self {
            TimeWindow::Day => chrono::Duration::days(1),
            TimeWindow::Week => chrono::Duration::days(7),
            TimeWindow::Month => chrono::Duration::days(30),
            TimeWindow::Year => chrono::Duration::days(365),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
            TimeWindow::Month => "month",
            TimeWindow::Year => "year",
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one pipeline run.
#[derive(Debug)]
pub enum SummaryOutcome {
    /// The remote summarizer answered.
    Summary(String),
    /// There was something to summarize but no usable answer came back.
    Fallback,
    /// Nothing in the window survived filtering.
    NoRelevantMessages,
    /// The channel history could not be read.
    FetchFailed(BotError),
}

impl SummaryOutcome {
    /// Summary text for `Summary` and `Fallback`.
    pub fn text(&self) -> Option<&str> {
        match self {
            SummaryOutcome::Summary(s) => Some(s),
            SummaryOutcome::Fallback => Some(FALLBACK_SUMMARY),
            _ => None,
        }
    }
}

/// Keep human messages longer than `min_chars` posted after `now - window`.
pub fn filter_messages(
    messages: Vec<ChannelMessage>,
    window: TimeWindow,
    now: DateTime<Utc>,
    min_chars: usize,
) -> Vec<ChannelMessage> {
    let cutoff = now - window.duration();
    messages
        .into_iter()
        .filter(|m| !m.author_is_bot)
        .filter(|m| m.content.chars().count() > min_chars)
        .filter(|m| m.timestamp > cutoff)
        .collect()
}

/// Join message bodies with single spaces, in the given order.
pub fn join_contents(messages: &[ChannelMessage]) -> String {
    messages
        .iter()
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cut `text` to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Fetch, filter, truncate, summarize.
pub struct SummaryPipeline {
    source: Arc<dyn MessageSource>,
    summarizer: Arc<dyn Summarizer>,
    config: SummaryConfig,
}

impl SummaryPipeline {
    pub fn new(
        source: Arc<dyn MessageSource>,
        summarizer: Arc<dyn Summarizer>,
        config: SummaryConfig,
    ) -> Self {
        Self {
            source,
            summarizer,
            config,
        }
    }

    pub fn config(&self) -> &SummaryConfig {
        &self.config
    }

    /// Run the pipeline for `channel` over `window` ending at `now`.
    pub async fn summarize(
        &self,
        channel: &ChannelRef,
        window: TimeWindow,
        now: DateTime<Utc>,
    ) -> SummaryOutcome {
        let fetched = match timeout(
            self.config.fetch_timeout,
            self.source
                .fetch_recent_messages(channel, self.config.fetch_limit),
        )
        .await
        {
            Ok(Ok(messages)) => messages,
            Ok(Err(e)) => {
                warn!(channel_id = channel.id, error = %e, "Failed to fetch channel history");
                return SummaryOutcome::FetchFailed(e);
            }
            Err(_) => {
                warn!(channel_id = channel.id, "Channel history fetch timed out");
                return SummaryOutcome::FetchFailed(BotError::Timeout {
                    stage: "fetch",
                    after: self.config.fetch_timeout,
                });
            }
        };

        let fetched_count = fetched.len();
        let kept = filter_messages(fetched, window, now, self.config.min_content_chars);
        debug!(
            channel_id = channel.id,
            window = %window,
            fetched = fetched_count,
            kept = kept.len(),
            "Filtered channel history"
        );

        let joined = join_contents(&kept);
        if joined.is_empty() {
            return SummaryOutcome::NoRelevantMessages;
        }
        let payload = truncate_chars(&joined, self.config.max_input_chars);

        match timeout(self.config.summarize_timeout, self.summarizer.summarize(payload)).await {
            Ok(Ok(summary)) if !summary.trim().is_empty() => {
                info!(channel_id = channel.id, input_chars = payload.chars().count(), "Summary generated");
                SummaryOutcome::Summary(summary)
            }
            Ok(Ok(_)) => {
                warn!(channel_id = channel.id, "Summarizer returned empty text, using fallback");
                SummaryOutcome::Fallback
            }
            Ok(Err(e)) => {
                warn!(channel_id = channel.id, error = %e, "Summarizer failed, using fallback");
                SummaryOutcome::Fallback
            }
            Err(_) => {
                warn!(
                    channel_id = channel.id,
                    after = ?self.config.summarize_timeout,
                    "Summarizer timed out, using fallback"
                );
                SummaryOutcome::Fallback
            }
        }
    }
}
