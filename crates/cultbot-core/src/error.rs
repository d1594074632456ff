//! Error types for the dispatch core.

use std::time::Duration;

use thiserror::Error;

use crate::reply::ReplyState;

/// Errors that can occur while dispatching or executing a command.
#[derive(Debug, Error)]
pub enum BotError {
    /// The user is still inside their cooldown window.
    #[error("Rate limited, retry in {seconds_remaining}s")]
    RateLimited { seconds_remaining: u64 },

    /// A reply primitive was called out of sequence.
    #[error("Cannot {action} while reply is {state:?}")]
    ProtocolViolation {
        action: &'static str,
        state: ReplyState,
    },

    /// Sending a reply or fetching data over the network failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A bounded stage ran past its budget.
    #[error("{stage} timed out after {after:?}")]
    Timeout { stage: &'static str, after: Duration },

    /// A remote service answered with an unexpected shape.
    #[error("Unexpected upstream response: {0}")]
    UpstreamFormat(String),

    /// A command with the same identifier is already registered.
    #[error("Command already registered: {0}")]
    DuplicateIdentifier(String),

    /// No command is registered under this identifier.
    #[error("Command not found: {0}")]
    NotFound(String),

    /// A required command option was not supplied.
    #[error("Missing required option: {0}")]
    MissingOption(String),

    /// Configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for dispatch operations.
pub type Result<T> = std::result::Result<T, BotError>;

impl From<reqwest::Error> for BotError {
    fn from(e: reqwest::Error) -> Self {
        BotError::Http(e.to_string())
    }
}

impl BotError {
    /// Returns true for failures caused by the network rather than by logic.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BotError::Transport(_) | BotError::Timeout { .. } | BotError::Http(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_violation_message() {
        let err = BotError::ProtocolViolation {
            action: "finalize",
            state: ReplyState::Received,
        };
        assert_eq!(err.to_string(), "Cannot finalize while reply is Received");
    }

    #[test]
    fn test_timeout_message() {
        let err = BotError::Timeout {
            stage: "message fetch",
            after: Duration::from_secs(5),
        };
        assert_eq!(err.to_string(), "message fetch timed out after 5s");
        assert!(err.is_transient());
    }

    #[test]
    fn test_logic_errors_are_not_transient() {
        assert!(!BotError::DuplicateIdentifier("ping".into()).is_transient());
        assert!(!BotError::MissingOption("prompt".into()).is_transient());
    }
}
