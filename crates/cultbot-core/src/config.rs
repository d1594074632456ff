//! Shared configuration for Cultbot.
//!
//! All tunables are read from environment-style key/value pairs. Secrets
//! usually live in an env file under the config directory:
//!
//! ```text
//! ~/.cultbot/
//! └── .env.local    # BOT_TOKEN, HUGGINGFACE_API_KEY, OPENAI_API_KEY, ...
//! ```
//!
//! # Environment Variables
//!
//! - `CULTBOT_CONFIG_DIR`: Override the config directory
//! - `COOLDOWN_SECS`: Per-user command cooldown, at most one day (default: 5)
//! - `FETCH_TIMEOUT_SECS`: Channel history fetch budget (default: 5)
//! - `SUMMARIZE_TIMEOUT_SECS`: Remote summarizer budget (default: 10)
//! - `PROVIDER_TIMEOUT_SECS`: OpenAI / Vertex request budget (default: 60)
//! - `SUMMARY_MAX_INPUT_CHARS`: Summarizer payload cap (default: 1100)
//! - `SUMMARY_FETCH_LIMIT`: Messages fetched per summary, 1 to 100 (default: 100)
//! - `HUGGINGFACE_SUMMARY_URL`: Summarization endpoint
//! - `HUGGINGFACE_API_KEY`, `OPENAI_API_KEY`, `OPENAI_MODEL`
//! - `PROJECT_ID`, `LOCATION`, `GOOGLE_ACCESS_TOKEN`: Vertex AI Imagen

use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::cooldown::{DEFAULT_COOLDOWN, MAX_COOLDOWN};
use crate::error::{BotError, Result};
use crate::summarizer::SummaryConfig;

/// Environment variable for custom config directory.
pub const CONFIG_DIR_ENV: &str = "CULTBOT_CONFIG_DIR";

/// Default config directory name under home.
const DEFAULT_CONFIG_DIR: &str = ".cultbot";

/// Default Hugging Face summarization model endpoint.
pub const DEFAULT_SUMMARIZER_URL: &str =
    "https://api-inference.huggingface.co/models/facebook/bart-large-cnn";

/// Default OpenAI chat model.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-mini";

/// Default Vertex AI region.
/// Discord serves at most this many messages per history request.
pub const MAX_FETCH_LIMIT: usize = 100;

pub const DEFAULT_VERTEX_LOCATION: &str = "us-central1";

/// Get the Cultbot config directory.
///
/// 1. `CULTBOT_CONFIG_DIR` environment variable if set
/// 2. `~/.cultbot` if home directory is available
/// 3. `.cultbot` in current directory as fallback
pub fn config_dir() -> PathBuf {
    std::env::var(CONFIG_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(DEFAULT_CONFIG_DIR))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR))
        })
}

/// Get the .env.local file path.
///
/// Environment file for secrets (API keys, tokens).
pub fn env_file() -> PathBuf {
    config_dir().join(".env.local")
}

/// Runtime configuration for the bot.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Minimum interval between two commands from the same user.
    pub cooldown: Duration,
    /// Summarization pipeline limits.
    pub summary: SummaryConfig,
    /// Budget for OpenAI and Vertex AI requests.
    pub provider_timeout: Duration,
    /// Hugging Face inference endpoint for summaries.
    pub summarizer_url: String,
    pub huggingface_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    /// Google Cloud project for Imagen.
    pub vertex_project_id: Option<String>,
    pub vertex_location: String,
    /// OAuth access token for Vertex AI.
    pub google_access_token: Option<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            cooldown: DEFAULT_COOLDOWN,
            summary: SummaryConfig::default(),
            provider_timeout: Duration::from_secs(60),
            summarizer_url: DEFAULT_SUMMARIZER_URL.to_string(),
            huggingface_api_key: None,
            openai_api_key: None,
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            vertex_project_id: None,
            vertex_location: DEFAULT_VERTEX_LOCATION.to_string(),
            google_access_token: None,
        }
    }
}

impl BotConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key/value source. Missing keys keep their defaults;
    /// present but malformed values are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(secs) = parse_in_range(&get, "COOLDOWN_SECS", 0..=MAX_COOLDOWN.as_secs())? {
            config.cooldown = Duration::from_secs(secs);
        }
        if let Some(secs) = parse::<u64>(&get, "FETCH_TIMEOUT_SECS")? {
            config.summary.fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse::<u64>(&get, "SUMMARIZE_TIMEOUT_SECS")? {
            config.summary.summarize_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse::<u64>(&get, "PROVIDER_TIMEOUT_SECS")? {
            config.provider_timeout = Duration::from_secs(secs);
        }
        if let Some(chars) = parse::<usize>(&get, "SUMMARY_MAX_INPUT_CHARS")? {
            config.summary.max_input_chars = chars;
        }
        if let Some(limit) = parse_in_range(&get, "SUMMARY_FETCH_LIMIT", 1..=MAX_FETCH_LIMIT)? {
            config.summary.fetch_limit = limit;
        }
        if let Some(raw) = get("HUGGINGFACE_SUMMARY_URL") {
            let url = Url::parse(&raw)
                .map_err(|e| BotError::Config(format!("HUGGINGFACE_SUMMARY_URL: {}", e)))?;
            config.summarizer_url = url.to_string();
        }

        config.huggingface_api_key = get("HUGGINGFACE_API_KEY");
        config.openai_api_key = get("OPENAI_API_KEY");
        if let Some(model) = get("OPENAI_MODEL") {
            config.openai_model = model;
        }
        config.vertex_project_id = get("PROJECT_ID");
        if let Some(location) = get("LOCATION") {
            config.vertex_location = location;
        }
        config.google_access_token = get("GOOGLE_ACCESS_TOKEN");

        Ok(config)
    }

    /// Sets the cooldown window.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Sets the summarization limits.
    pub fn with_summary(mut self, summary: SummaryConfig) -> Self {
        self.summary = summary;
        self
    }

    /// Sets the provider request budget.
    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }
}

fn parse<T>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| BotError::Config(format!("{}={:?}: {}", key, raw, e)))
        })
        .transpose()
}

fn parse_in_range<T>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    range: RangeInclusive<T>,
) -> Result<Option<T>>
where
    T: FromStr + PartialOrd + std::fmt::Debug,
    T::Err: std::fmt::Display,
{
    match parse::<T>(get, key)? {
        Some(value) if !range.contains(&value) => Err(BotError::Config(format!(
            "{}={:?}: expected {:?}..={:?}",
            key,
            value,
            range.start(),
            range.end()
        ))),
        value => Ok(value),
    }
}
