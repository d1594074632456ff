//! `/commands`: list what the bot can do.

use async_trait::async_trait;
use cultbot_core::{CommandHandler, CommandSpec, InboundRequest, ReplyController, Result};

pub struct HelpCommand {
    spec: CommandSpec,
    text: String,
}

impl HelpCommand {
    /// Builds the listing from the other commands' specs plus itself.
    pub fn new(others: &[CommandSpec]) -> Self {
        let spec = CommandSpec::new("commands", "Lists all Cult-bot commands");

        let mut entries: Vec<&CommandSpec> = others.iter().chain(Some(&spec)).collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        let mut text = String::from("Commands:");
        for entry in entries {
            text.push_str(&format!("\n/{} - {}", entry.name, entry.description));
        }

        Self { spec, text }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[async_trait]
impl CommandHandler for HelpCommand {
    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    async fn execute(&self, _request: &InboundRequest, reply: &mut ReplyController) -> Result<()> {
        reply.acknowledge(self.text.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_sorted() {
        let help = HelpCommand::new(&[
            CommandSpec::new("ping", "Check bot ping"),
            CommandSpec::new("image", "Make a picture"),
        ]);

        assert_eq!(
            help.text(),
            "Commands:\n/commands - Lists all Cult-bot commands\n/image - Make a picture\n/ping - Check bot ping"
        );
    }
}
