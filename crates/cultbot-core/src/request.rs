//! Inbound interaction model.
//!
//! The platform adapter converts whatever its gateway delivers into an
//! [`InboundEvent`]. Only [`InboundEvent::Command`] carries work for the
//! dispatcher; everything else is ignored.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::{BotError, Result};

/// A reference to a chat channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRef {
    /// Platform channel ID.
    pub id: u64,
    /// Channel name, when the platform resolved it.
    pub name: Option<String>,
}

impl ChannelRef {
    pub fn new(id: u64) -> Self {
        Self { id, name: None }
    }

    pub fn named(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }

    /// Mention syntax that renders as a clickable channel link.
    pub fn mention(&self) -> String {
        format!("<#{}>", self.id)
    }
}

impl fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mention())
    }
}

/// A typed command option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    Channel(ChannelRef),
    User(u64),
}

/// A slash-command invocation. Immutable once received.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    /// Platform interaction ID, stable across redeliveries.
    pub interaction_id: u64,
    /// Invoking user.
    pub user_id: u64,
    /// Channel the command was invoked in.
    pub channel_id: u64,
    /// Command identifier.
    pub command: String,
    /// Typed arguments keyed by option name.
    pub options: HashMap<String, OptionValue>,
    /// When the platform created the interaction.
    pub created_at: DateTime<Utc>,
    /// Last measured gateway heartbeat round trip, if known.
    pub gateway_latency: Option<Duration>,
}

impl InboundRequest {
    pub fn new(interaction_id: u64, user_id: u64, command: impl Into<String>) -> Self {
        Self {
            interaction_id,
            user_id,
            channel_id: 0,
            command: command.into(),
            options: HashMap::new(),
            created_at: Utc::now(),
            gateway_latency: None,
        }
    }

    pub fn with_channel(mut self, channel_id: u64) -> Self {
        self.channel_id = channel_id;
        self
    }

    pub fn with_option(mut self, name: impl Into<String>, value: OptionValue) -> Self {
        self.options.insert(name.into(), value);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_gateway_latency(mut self, latency: Option<Duration>) -> Self {
        self.gateway_latency = latency;
        self
    }

    /// Get a string option, if present.
    pub fn string(&self, name: &str) -> Option<&str> {
        match self.options.get(name) {
            Some(OptionValue::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Get a channel option, if present.
    pub fn channel(&self, name: &str) -> Option<&ChannelRef> {
        match self.options.get(name) {
            Some(OptionValue::Channel(c)) => Some(c),
            _ => None,
        }
    }

    /// Get a required string option.
    pub fn require_string(&self, name: &str) -> Result<&str> {
        self.string(name)
            .ok_or_else(|| BotError::MissingOption(name.to_string()))
    }

    /// Get a required channel option.
    pub fn require_channel(&self, name: &str) -> Result<&ChannelRef> {
        self.channel(name)
            .ok_or_else(|| BotError::MissingOption(name.to_string()))
    }
}

/// An event delivered by the platform.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    /// A slash-command invocation.
    Command(InboundRequest),
    /// Anything else (autocomplete, components, modals).
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_mention() {
        let channel = ChannelRef::named(42, "general");
        assert_eq!(channel.mention(), "<#42>");
        assert_eq!(channel.to_string(), "<#42>");
    }

    #[test]
    fn test_typed_option_access() {
        let request = InboundRequest::new(1, 7, "summarize")
            .with_option("channel", OptionValue::Channel(ChannelRef::new(99)))
            .with_option("timeframe", OptionValue::String("week".into()));

        assert_eq!(request.string("timeframe"), Some("week"));
        assert_eq!(request.channel("channel"), Some(&ChannelRef::new(99)));
        // Wrong type reads as absent
        assert_eq!(request.string("channel"), None);
    }

    #[test]
    fn test_require_missing_option() {
        let request = InboundRequest::new(1, 7, "4-1_mini");
        let err = request.require_string("prompt").unwrap_err();
        assert!(matches!(err, BotError::MissingOption(name) if name == "prompt"));
    }
}
