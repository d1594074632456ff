//! In-memory fakes of the platform and provider seams.
//!
//! Available to this crate's tests and to other crates with the
//! `test-support` feature.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{BotError, Result};
use crate::reply::{InteractionResponder, Reply};
use crate::request::ChannelRef;
use crate::summarizer::{ChannelMessage, MessageSource, Summarizer};

/// One outbound call observed by [`RecordingResponder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Ack(Reply),
    Placeholder,
    Edit(Reply),
}

/// Responder that records successful sends and can be told to fail.
#[derive(Default)]
pub struct RecordingResponder {
    sent: Mutex<Vec<Sent>>,
    attempts: Mutex<usize>,
    fail_ack: bool,
    fail_placeholder: bool,
    fail_edit: bool,
}

impl RecordingResponder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_ack(mut self) -> Self {
        self.fail_ack = true;
        self
    }

    pub fn fail_placeholder(mut self) -> Self {
        self.fail_placeholder = true;
        self
    }

    pub fn fail_edit(mut self) -> Self {
        self.fail_edit = true;
        self
    }

    /// Successful sends, in order.
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// All send attempts, successful or not.
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }

    pub fn edit_count(&self) -> usize {
        self.sent()
            .iter()
            .filter(|s| matches!(s, Sent::Edit(_)))
            .count()
    }

    /// Content of the last successful send that carried content.
    pub fn last_content(&self) -> Option<String> {
        self.sent().into_iter().rev().find_map(|s| match s {
            Sent::Ack(r) | Sent::Edit(r) => Some(r.content),
            Sent::Placeholder => None,
        })
    }

    fn record(&self, fail: bool, sent: Sent) -> Result<()> {
        *self.attempts.lock().unwrap() += 1;
        if fail {
            return Err(BotError::Transport("connection reset".to_string()));
        }
        self.sent.lock().unwrap().push(sent);
        Ok(())
    }
}

#[async_trait]
impl InteractionResponder for RecordingResponder {
    async fn send_acknowledgment(&self, reply: &Reply) -> Result<()> {
        self.record(self.fail_ack, Sent::Ack(reply.clone()))
    }

    async fn send_deferred_placeholder(&self) -> Result<()> {
        self.record(self.fail_placeholder, Sent::Placeholder)
    }

    async fn edit_deferred_reply(&self, reply: &Reply) -> Result<()> {
        self.record(self.fail_edit, Sent::Edit(reply.clone()))
    }
}

/// Message source that returns a fixed list, optionally slowly or not at all.
#[derive(Default)]
pub struct StaticSource {
    messages: Vec<ChannelMessage>,
    delay: Option<Duration>,
    fail: bool,
    requested_limits: Mutex<Vec<usize>>,
}

impl StaticSource {
    pub fn new(messages: Vec<ChannelMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Limits passed to each fetch, in call order.
    pub fn requested_limits(&self) -> Vec<usize> {
        self.requested_limits.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSource for StaticSource {
    async fn fetch_recent_messages(
        &self,
        _channel: &ChannelRef,
        limit: usize,
    ) -> Result<Vec<ChannelMessage>> {
        self.requested_limits.lock().unwrap().push(limit);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(BotError::Transport("missing access".to_string()));
        }
        Ok(self.messages.iter().take(limit).cloned().collect())
    }
}

/// Summarizer that answers from a script and records its inputs.
#[derive(Default)]
pub struct StaticSummarizer {
    answer: Option<String>,
    delay: Option<Duration>,
    inputs: Mutex<Vec<String>>,
}

impl StaticSummarizer {
    /// Always answers `summary`.
    pub fn answering(summary: impl Into<String>) -> Self {
        Self {
            answer: Some(summary.into()),
            ..Self::default()
        }
    }

    /// Always fails with an upstream format error.
    pub fn malformed() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Payloads received, in call order.
    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Summarizer for StaticSummarizer {
    async fn summarize(&self, inputs: &str) -> Result<String> {
        self.inputs.lock().unwrap().push(inputs.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.answer
            .clone()
            .ok_or_else(|| BotError::UpstreamFormat("missing summary_text".to_string()))
    }
}
