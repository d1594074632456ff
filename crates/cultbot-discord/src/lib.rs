//! Cultbot Discord - serenity adapter for the Cultbot dispatch core.
//!
//! Converts gateway interactions into core requests, implements the reply
//! primitives and channel history reads over Discord's REST API, and
//! uploads the command schemas on connect. Also answers a plain-text
//! trigger and greets new guild members.

pub mod bot;
pub mod convert;
pub mod error;
pub mod events;
pub mod handler;
pub mod presence;
pub mod responder;
pub mod source;

pub use bot::CultBot;
pub use error::{DiscordError, Result};
pub use presence::PresenceConfig;
