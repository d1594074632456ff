//! Hugging Face inference API summarizer.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{BotError, Result};
use crate::summarizer::Summarizer;

#[derive(Debug, Deserialize)]
struct SummaryItem {
    summary_text: Option<String>,
}

/// Extract the first `summary_text` from an inference response body.
pub fn parse_summary(body: &str) -> Result<String> {
    let items: Vec<SummaryItem> = serde_json::from_str(body)
        .map_err(|e| BotError::UpstreamFormat(format!("unexpected body: {}", e)))?;

    items
        .into_iter()
        .next()
        .and_then(|item| item.summary_text)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| BotError::UpstreamFormat("missing summary_text".to_string()))
}

/// Summarizer backed by a hosted summarization model.
pub struct HuggingFaceSummarizer {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HuggingFaceSummarizer {
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            api_key,
        }
    }
}

#[async_trait]
impl Summarizer for HuggingFaceSummarizer {
    async fn summarize(&self, inputs: &str) -> Result<String> {
        let mut request = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "inputs": inputs }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BotError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            debug!(%status, body = %body, "Summarizer returned error status");
            return Err(BotError::Transport(format!("summarizer returned {}", status)));
        }

        parse_summary(&body)
    }
}
