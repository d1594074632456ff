//! Single entry point for inbound interactions.
//!
//! ```text
//! event ─▶ command? ─▶ first delivery? ─▶ cooldown ─▶ lookup ─▶ handler
//!              │              │              │           │          │
//!           Ignored       Duplicate     RateLimited  Unknown   Completed / Recovered
//! ```
//!
//! Every request that reaches the cooldown gate ends with exactly one
//! user-visible message, except unknown commands which are dropped silently.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::cooldown::{Cooldown, CooldownTracker};
use crate::dedup::DedupGuard;
use crate::registry::CommandRegistry;
use crate::reply::{InteractionResponder, Reply, ReplyController};
use crate::request::{InboundEvent, InboundRequest};

/// Notice sent when a command fails for any reason.
pub const GENERIC_FAILURE: &str = "There was an error while executing this command!";

/// What happened to one inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Not a command invocation.
    Ignored,
    /// Redelivery of an interaction already handled.
    Duplicate,
    /// Rejected by the cooldown gate.
    RateLimited { seconds_remaining: u64 },
    /// No handler for this identifier.
    UnknownCommand,
    /// The handler produced its own outcome.
    Completed,
    /// The handler failed and the generic notice was attempted.
    Recovered,
}

/// Routes inbound events to command handlers.
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    cooldowns: Arc<CooldownTracker>,
    dedup: DedupGuard,
}

impl Dispatcher {
    pub fn new(registry: Arc<CommandRegistry>, cooldowns: Arc<CooldownTracker>) -> Self {
        Self {
            registry,
            cooldowns,
            dedup: DedupGuard::default(),
        }
    }

    pub fn with_dedup(mut self, dedup: DedupGuard) -> Self {
        self.dedup = dedup;
        self
    }

    /// Shared cooldown state, for the periodic purge.
    pub fn cooldowns(&self) -> Arc<CooldownTracker> {
        Arc::clone(&self.cooldowns)
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Handle one inbound event. Never fails.
    pub async fn dispatch(
        &self,
        event: InboundEvent,
        responder: Arc<dyn InteractionResponder>,
    ) -> DispatchOutcome {
        let request = match event {
            InboundEvent::Command(request) => request,
            InboundEvent::Other => return DispatchOutcome::Ignored,
        };

        let span = info_span!(
            "dispatch",
            command = %request.command,
            user_id = request.user_id,
            interaction_id = request.interaction_id,
        );
        self.dispatch_command(request, responder)
            .instrument(span)
            .await
    }

    async fn dispatch_command(
        &self,
        request: InboundRequest,
        responder: Arc<dyn InteractionResponder>,
    ) -> DispatchOutcome {
        let now = Instant::now();

        if !self.dedup.first_delivery(request.interaction_id, now) {
            return DispatchOutcome::Duplicate;
        }

        let mut reply = ReplyController::new(responder);

        if let Cooldown::Denied { seconds_remaining } =
            self.cooldowns.check_and_consume(request.user_id, now)
        {
            info!(seconds_remaining, "User on cooldown");
            let notice = Reply::ephemeral(format!(
                "Please wait {} second(s) before using another command.",
                seconds_remaining
            ));
            if let Err(e) = reply.acknowledge(notice).await {
                warn!(error = %e, "Failed to send cooldown notice");
            }
            return DispatchOutcome::RateLimited { seconds_remaining };
        }

        let handler = match self.registry.lookup(&request.command) {
            Ok(handler) => handler,
            Err(_) => {
                warn!("No handler registered for command");
                return DispatchOutcome::UnknownCommand;
            }
        };

        debug!("Executing command");
        let result = AssertUnwindSafe(handler.execute(&request, &mut reply))
            .catch_unwind()
            .await;
        let result = match result {
            Ok(result) => result,
            Err(panic) => {
                error!(panic = %panic_message(&*panic), state = ?reply.state(), "Command panicked");
                reply.notify_failure(GENERIC_FAILURE).await;
                return DispatchOutcome::Recovered;
            }
        };

        match result {
            Ok(()) if reply.state().is_terminal() => {
                debug!(state = ?reply.state(), "Command completed");
                DispatchOutcome::Completed
            }
            Ok(()) => {
                error!(state = ?reply.state(), "Command returned without a reply");
                reply.notify_failure(GENERIC_FAILURE).await;
                DispatchOutcome::Recovered
            }
            Err(e) => {
                error!(error = %e, transient = e.is_transient(), state = ?reply.state(), "Command failed");
                reply.notify_failure(GENERIC_FAILURE).await;
                DispatchOutcome::Recovered
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}
