//! `/ping`: report round-trip latency.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use cultbot_core::{CommandHandler, CommandSpec, InboundRequest, ReplyController, Result};

pub struct PingCommand {
    spec: CommandSpec,
}

impl PingCommand {
    pub fn new() -> Self {
        Self {
            spec: CommandSpec::new("ping", "Replies with latency information!"),
        }
    }
}

impl Default for PingCommand {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandHandler for PingCommand {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    async fn execute(&self, request: &InboundRequest, reply: &mut ReplyController) -> Result<()> {
        let latency = (Utc::now() - request.created_at).num_milliseconds().max(0);
        reply
            .acknowledge(connection_report(latency, request.gateway_latency))
            .await
    }
}

/// The gateway reports no latency until the first heartbeat is acknowledged.
fn connection_report(bot_ms: i64, gateway: Option<Duration>) -> String {
    let api = match gateway {
        Some(latency) => format!("{}ms", latency.as_millis()),
        None => "n/a".to_string(),
    };
    format!("Connection:\n--> Bot Latency: {}ms\n--> API Latency: {}", bot_ms, api)
}
