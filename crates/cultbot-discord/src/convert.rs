//! Translation between serenity models and the core request and schema types.

use std::time::Duration;

use chrono::{DateTime, Utc};
use cultbot_core::{ChannelRef, CommandSpec, InboundEvent, InboundRequest, OptionKind, OptionValue};
use serenity::builder::{CreateCommand, CreateCommandOption};
use serenity::model::application::{
    CommandInteraction, CommandOptionType, Interaction, ResolvedValue,
};
use serenity::model::channel::ChannelType;
use serenity::model::Timestamp;

/// Second-precision conversion of a Discord timestamp.
pub fn to_utc(timestamp: Timestamp) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(timestamp.unix_timestamp(), 0).unwrap_or_default()
}

/// Typed value of one resolved option. Unsupported kinds are dropped.
pub fn to_option_value(value: &ResolvedValue<'_>) -> Option<OptionValue> {
    match value {
        ResolvedValue::String(s) => Some(OptionValue::String(s.to_string())),
        ResolvedValue::Integer(i) => Some(OptionValue::Integer(*i)),
        ResolvedValue::Boolean(b) => Some(OptionValue::Boolean(*b)),
        ResolvedValue::Channel(c) => Some(OptionValue::Channel(match &c.name {
            Some(name) => ChannelRef::named(c.id.get(), name.clone()),
            None => ChannelRef::new(c.id.get()),
        })),
        ResolvedValue::User(u, _) => Some(OptionValue::User(u.id.get())),
        _ => None,
    }
}

/// Build the core request for a slash command invocation.
pub fn to_request(command: &CommandInteraction) -> InboundRequest {
    let mut request = InboundRequest::new(
        command.id.get(),
        command.user.id.get(),
        command.data.name.clone(),
    )
    .with_channel(command.channel_id.get())
    .with_created_at(to_utc(command.id.created_at()));

    for option in command.data.options() {
        if let Some(value) = to_option_value(&option.value) {
            request = request.with_option(option.name, value);
        }
    }
    request
}

/// Classify a gateway interaction, attaching the shard's heartbeat latency.
pub fn to_event(interaction: &Interaction, gateway_latency: Option<Duration>) -> InboundEvent {
    match interaction {
        Interaction::Command(command) => {
            InboundEvent::Command(to_request(command).with_gateway_latency(gateway_latency))
        }
        _ => InboundEvent::Other,
    }
}

fn option_type(kind: OptionKind) -> CommandOptionType {
    match kind {
        OptionKind::String => CommandOptionType::String,
        OptionKind::Integer => CommandOptionType::Integer,
        OptionKind::Boolean => CommandOptionType::Boolean,
        OptionKind::Channel => CommandOptionType::Channel,
        OptionKind::User => CommandOptionType::User,
    }
}

/// Slash command schema for upload.
pub fn to_create_command(spec: &CommandSpec) -> CreateCommand {
    let mut command = CreateCommand::new(spec.name.clone()).description(spec.description.clone());

    for option in &spec.options {
        let mut builder = CreateCommandOption::new(
            option_type(option.kind),
            option.name.clone(),
            option.description.clone(),
        )
        .required(option.required);

        if option.kind == OptionKind::Channel {
            builder = builder.channel_types(vec![ChannelType::Text]);
        }
        for choice in &option.choices {
            builder = builder.add_string_choice(choice.name.clone(), choice.value.clone());
        }
        command = command.add_option(builder);
    }
    command
}
