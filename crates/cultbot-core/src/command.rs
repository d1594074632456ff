//! Core trait for command handlers.
//!
//! Every slash command implements [`CommandHandler`]. The handler declares its
//! schema through [`CommandSpec`] and decides, per invocation, whether to
//! answer immediately or defer and finalize later.

use async_trait::async_trait;

use crate::error::Result;
use crate::reply::ReplyController;
use crate::request::InboundRequest;

/// Kind of value an option accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    String,
    Integer,
    Boolean,
    /// A text channel.
    Channel,
    User,
}

/// A fixed choice offered for a string option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionChoice {
    /// Label shown to the user.
    pub name: String,
    /// Value delivered to the handler.
    pub value: String,
}

/// Schema of one command option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    pub name: String,
    pub description: String,
    pub kind: OptionKind,
    pub required: bool,
    pub choices: Vec<OptionChoice>,
}

impl OptionSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>, kind: OptionKind) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            required: false,
            choices: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn choice(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.choices.push(OptionChoice {
            name: name.into(),
            value: value.into(),
        });
        self
    }
}

/// Declared schema of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Unique identifier, as typed after the slash.
    pub name: String,
    pub description: String,
    pub options: Vec<OptionSpec>,
}

impl CommandSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            options: Vec::new(),
        }
    }

    pub fn option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }
}

/// Trait for command handlers.
///
/// Handlers must leave the reply in a terminal state: either
/// [`ReplyController::acknowledge`] once, or [`ReplyController::defer`]
/// followed by exactly one [`ReplyController::finalize`]. Any error returned
/// is turned into a generic failure notice by the dispatcher.
///
/// # Example
///
/// ```ignore
/// struct Echo { spec: CommandSpec }
///
/// #[async_trait]
/// impl CommandHandler for Echo {
///     fn spec(&self) -> &CommandSpec { &self.spec }
///
///     async fn execute(&self, request: &InboundRequest, reply: &mut ReplyController) -> Result<()> {
///         let text = request.require_string("text")?;
///         reply.acknowledge(text.to_string()).await
///     }
/// }
/// ```
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Returns the declared schema of this command.
    fn spec(&self) -> &CommandSpec;

    /// Returns the command identifier.
    fn name(&self) -> &str {
        &self.spec().name
    }

    /// Runs the command for one invocation.
    async fn execute(&self, request: &InboundRequest, reply: &mut ReplyController) -> Result<()>;
}
