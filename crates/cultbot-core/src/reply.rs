//! Two-phase reply protocol.
//!
//! The platform requires an answer to every interaction within a short
//! deadline. A handler either answers immediately ([`ReplyController::acknowledge`])
//! or sends a placeholder ([`ReplyController::defer`]) and replaces it exactly
//! once later ([`ReplyController::finalize`]).
//!
//! ```text
//! Received ──acknowledge──▶ Acknowledged
//!    │
//!    └──defer──▶ Deferred ──finalize──▶ Finalized
//!
//! any non-terminal state ──send failure──▶ Failed
//! ```
//!
//! The controller never retries.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::error::{BotError, Result};

/// A file sent along with a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Outbound reply content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    /// Visible only to the invoking user.
    pub ephemeral: bool,
    pub attachments: Vec<Attachment>,
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: true,
            ..Self::default()
        }
    }

    pub fn with_attachment(mut self, filename: impl Into<String>, data: Vec<u8>) -> Self {
        self.attachments.push(Attachment {
            filename: filename.into(),
            data,
        });
        self
    }
}

impl From<&str> for Reply {
    fn from(s: &str) -> Self {
        Reply::text(s)
    }
}

impl From<String> for Reply {
    fn from(s: String) -> Self {
        Reply::text(s)
    }
}

/// Outbound reply primitives provided by the platform adapter.
///
/// Each call is an independent network request that may fail.
#[async_trait]
pub trait InteractionResponder: Send + Sync {
    /// Answer the interaction immediately.
    async fn send_acknowledgment(&self, reply: &Reply) -> Result<()>;

    /// Answer with a "thinking" placeholder, opening the extended window.
    async fn send_deferred_placeholder(&self) -> Result<()>;

    /// Replace the deferred placeholder with real content.
    async fn edit_deferred_reply(&self, reply: &Reply) -> Result<()>;
}

/// Lifecycle of a single interaction's reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyState {
    /// Nothing sent yet.
    Received,
    /// Immediate reply sent. Terminal.
    Acknowledged,
    /// Placeholder sent; one finalize pending.
    Deferred,
    /// Placeholder replaced. Terminal.
    Finalized,
    /// A send failed. Terminal.
    Failed,
}

impl ReplyState {
    /// Returns true once no further reply is expected.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ReplyState::Acknowledged | ReplyState::Finalized | ReplyState::Failed
        )
    }
}

/// Drives the reply protocol for one interaction.
pub struct ReplyController {
    responder: Arc<dyn InteractionResponder>,
    state: ReplyState,
    /// Whether a placeholder was successfully sent at some point.
    placeholder_sent: bool,
    /// Whether the dispatcher already spent its one failure notice.
    notice_attempted: bool,
}

impl ReplyController {
    pub fn new(responder: Arc<dyn InteractionResponder>) -> Self {
        Self {
            responder,
            state: ReplyState::Received,
            placeholder_sent: false,
            notice_attempted: false,
        }
    }

    /// Current state.
    pub fn state(&self) -> ReplyState {
        self.state
    }

    fn violation(&self, action: &'static str) -> BotError {
        error!(action, state = ?self.state, "Reply protocol violation");
        BotError::ProtocolViolation {
            action,
            state: self.state,
        }
    }

    /// Send an immediate reply. Only valid from `Received`.
    pub async fn acknowledge(&mut self, reply: impl Into<Reply>) -> Result<()> {
        if self.state != ReplyState::Received {
            return Err(self.violation("acknowledge"));
        }
        let reply = reply.into();
        match self.responder.send_acknowledgment(&reply).await {
            Ok(()) => {
                self.state = ReplyState::Acknowledged;
                debug!(ephemeral = reply.ephemeral, "Interaction acknowledged");
                Ok(())
            }
            Err(e) => {
                self.state = ReplyState::Failed;
                Err(into_transport(e))
            }
        }
    }

    /// Send a placeholder and open the extended window. Only valid from `Received`.
    pub async fn defer(&mut self) -> Result<()> {
        if self.state != ReplyState::Received {
            return Err(self.violation("defer"));
        }
        match self.responder.send_deferred_placeholder().await {
            Ok(()) => {
                self.state = ReplyState::Deferred;
                self.placeholder_sent = true;
                debug!("Interaction deferred");
                Ok(())
            }
            Err(e) => {
                self.state = ReplyState::Failed;
                Err(into_transport(e))
            }
        }
    }

    /// Replace the placeholder. Only valid from `Deferred`, exactly once.
    pub async fn finalize(&mut self, reply: impl Into<Reply>) -> Result<()> {
        if self.state != ReplyState::Deferred {
            return Err(self.violation("finalize"));
        }
        let reply = reply.into();
        match self.responder.edit_deferred_reply(&reply).await {
            Ok(()) => {
                self.state = ReplyState::Finalized;
                debug!("Deferred reply finalized");
                Ok(())
            }
            Err(e) => {
                self.state = ReplyState::Failed;
                Err(into_transport(e))
            }
        }
    }

    /// Make one best-effort attempt to tell the user something went wrong.
    ///
    /// Picks the primitive that fits the current state, is attempted at most
    /// once per interaction, and never returns an error: a failure here is
    /// only logged.
    pub async fn notify_failure(&mut self, message: &str) {
        if self.notice_attempted {
            debug!(state = ?self.state, "Failure notice already attempted");
            return;
        }

        let use_edit = match self.state {
            ReplyState::Acknowledged | ReplyState::Finalized => return,
            ReplyState::Deferred => true,
            ReplyState::Received => false,
            ReplyState::Failed => self.placeholder_sent,
        };
        self.notice_attempted = true;

        let reply = Reply::ephemeral(message);
        let result = if use_edit {
            self.responder.edit_deferred_reply(&reply).await
        } else {
            self.responder.send_acknowledgment(&reply).await
        };

        match result {
            Ok(()) => match self.state {
                ReplyState::Deferred => self.state = ReplyState::Finalized,
                ReplyState::Received => self.state = ReplyState::Acknowledged,
                _ => {}
            },
            Err(e) => {
                warn!(error = %e, state = ?self.state, "Failed to send failure notice");
                self.state = ReplyState::Failed;
            }
        }
    }
}

fn into_transport(e: BotError) -> BotError {
    match e {
        BotError::Transport(_) => e,
        other => BotError::Transport(other.to_string()),
    }
}
