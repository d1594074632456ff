//! Serenity event handler.

use std::sync::Arc;

use std::time::Duration;

use cultbot_core::{CommandSpec, Dispatcher};
use serenity::async_trait;
use serenity::gateway::ShardManager;
use serenity::model::application::{Command, Interaction};
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::guild::Member;
use serenity::prelude::*;
use tracing::{debug, error, info, warn};

use crate::convert::{to_create_command, to_event};
use crate::events::{auto_reply, welcome_message, WELCOME_CHANNEL};
use crate::presence::PresenceConfig;
use crate::responder::DiscordResponder;

/// Client data key for the shard manager, read to report heartbeat latency.
pub struct ShardManagerContainer;

impl TypeMapKey for ShardManagerContainer {
    type Value = Arc<ShardManager>;
}

async fn shard_latency(ctx: &Context) -> Option<Duration> {
    let data = ctx.data.read().await;
    let manager = data.get::<ShardManagerContainer>()?;
    let runners = manager.runners.lock().await;
    runners.get(&ctx.shard_id).and_then(|runner| runner.latency)
}

pub struct Handler {
    dispatcher: Arc<Dispatcher>,
    specs: Vec<CommandSpec>,
    register_commands: bool,
    presence: PresenceConfig,
}

impl Handler {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        specs: Vec<CommandSpec>,
        register_commands: bool,
        presence: PresenceConfig,
    ) -> Self {
        Self {
            dispatcher,
            specs,
            register_commands,
            presence,
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, guilds = ready.guilds.len(), "Discord bot connected");

        ctx.set_presence(self.presence.activity_data(), self.presence.status);
        info!(status = ?self.presence.status, activity = ?self.presence.activity, "Presence set");

        if !self.register_commands {
            debug!("Skipping slash command registration");
            return;
        }
        let commands = self.specs.iter().map(to_create_command).collect::<Vec<_>>();
        match Command::set_global_commands(&ctx.http, commands).await {
            Ok(registered) => info!(count = registered.len(), "Slash commands registered globally"),
            Err(e) => error!(error = %e, "Failed to register slash commands"),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let event = to_event(&interaction, shard_latency(&ctx).await);
        let kind = interaction.kind();
        let Interaction::Command(command) = interaction else {
            debug!(?kind, "Ignoring non-command interaction");
            return;
        };

        let responder = Arc::new(DiscordResponder::new(ctx.http.clone(), command));
        let dispatcher = Arc::clone(&self.dispatcher);

        // Own task so a panicking handler only loses its own interaction.
        let task = tokio::spawn(async move { dispatcher.dispatch(event, responder).await });
        match task.await {
            Ok(outcome) => debug!(?outcome, "Interaction dispatched"),
            Err(e) => error!(error = %e, "Dispatch task failed"),
        }
    }

    async fn message(&self, ctx: Context, message: Message) {
        let Some(text) = auto_reply(&message.content, message.author.bot) else {
            return;
        };
        if let Err(e) = message.reply(&ctx, text).await {
            warn!(error = %e, channel_id = %message.channel_id, "Failed to send auto reply");
        }
    }

    async fn guild_member_addition(&self, ctx: Context, member: Member) {
        let channels = match member.guild_id.channels(&ctx.http).await {
            Ok(channels) => channels,
            Err(e) => {
                warn!(error = %e, guild_id = %member.guild_id, "Failed to list guild channels");
                return;
            }
        };
        let Some(channel) = channels.values().find(|c| c.name == WELCOME_CHANNEL) else {
            debug!(guild_id = %member.guild_id, "No welcome channel in guild");
            return;
        };

        let greeting = welcome_message(&member.user.tag());
        match channel.id.say(&ctx.http, greeting).await {
            Ok(_) => info!(user_id = %member.user.id, "Welcomed new member"),
            Err(e) => warn!(error = %e, channel_id = %channel.id, "Failed to send welcome"),
        }
    }
}
