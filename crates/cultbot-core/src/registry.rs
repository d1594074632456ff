//! Command registry for looking up handlers by identifier.

use std::collections::HashMap;
use std::sync::Arc;

use crate::command::{CommandHandler, CommandSpec};
use crate::error::{BotError, Result};

/// Registry for command handlers.
///
/// Built once at startup from a static list and then shared immutably
/// behind an `Arc`. All handlers are stored as `Arc<dyn CommandHandler>`
/// so they can be invoked from any task.
///
/// # Example
///
/// ```ignore
/// use cultbot_core::CommandRegistry;
///
/// let registry = CommandRegistry::from_handlers(handlers)?;
///
/// if let Ok(handler) = registry.lookup("summarize") {
///     println!("Using: {}", handler.spec().description);
/// }
/// ```
pub struct CommandRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Creates a registry from a list of handlers.
    ///
    /// Fails on the first duplicate identifier.
    pub fn from_handlers(
        handlers: impl IntoIterator<Item = Arc<dyn CommandHandler>>,
    ) -> Result<Self> {
        let mut registry = Self::empty();
        for handler in handlers {
            registry.register(handler)?;
        }
        Ok(registry)
    }

    /// Registers a handler under its declared name.
    pub fn register(&mut self, handler: Arc<dyn CommandHandler>) -> Result<()> {
        let name = handler.name().to_string();
        if self.handlers.contains_key(&name) {
            return Err(BotError::DuplicateIdentifier(name));
        }
        self.handlers.insert(name, handler);
        Ok(())
    }

    /// Gets a handler by identifier.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn CommandHandler>> {
        self.handlers
            .get(name)
            .cloned()
            .ok_or_else(|| BotError::NotFound(name.to_string()))
    }

    /// Lists all registered identifiers, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Declared schemas of all commands, sorted by name.
    pub fn specs(&self) -> Vec<CommandSpec> {
        self.list()
            .into_iter()
            .filter_map(|name| self.handlers.get(name))
            .map(|h| h.spec().clone())
            .collect()
    }

    /// Returns the number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::ReplyController;
    use crate::request::InboundRequest;
    use async_trait::async_trait;

    struct Fixed {
        spec: CommandSpec,
    }

    impl Fixed {
        fn new(name: &str) -> Arc<dyn CommandHandler> {
            Arc::new(Self {
                spec: CommandSpec::new(name, format!("{} command", name)),
            })
        }
    }

    #[async_trait]
    impl CommandHandler for Fixed {
        fn spec(&self) -> &CommandSpec {
            &self.spec
        }

        async fn execute(&self, _: &InboundRequest, reply: &mut ReplyController) -> Result<()> {
            reply.acknowledge(self.spec.name.clone()).await
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = CommandRegistry::empty();
        assert!(registry.is_empty());

        registry.register(Fixed::new("ping")).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("ping").unwrap().name(), "ping");
    }

    #[test]
    fn test_lookup_unknown() {
        let registry = CommandRegistry::empty();
        assert!(matches!(
            registry.lookup("nope"),
            Err(BotError::NotFound(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_duplicate_identifier_rejected() {
        let mut registry = CommandRegistry::empty();
        registry.register(Fixed::new("ping")).unwrap();

        let err = registry.register(Fixed::new("ping")).unwrap_err();
        assert!(matches!(err, BotError::DuplicateIdentifier(name) if name == "ping"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_from_handlers_stops_on_duplicate() {
        let result = CommandRegistry::from_handlers(vec![
            Fixed::new("a"),
            Fixed::new("b"),
            Fixed::new("a"),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_specs_sorted() {
        let registry =
            CommandRegistry::from_handlers(vec![Fixed::new("summarize"), Fixed::new("image")])
                .unwrap();

        assert_eq!(registry.list(), vec!["image", "summarize"]);
        let specs = registry.specs();
        assert_eq!(specs[0].name, "image");
        assert_eq!(specs[1].description, "summarize command");
    }

    #[test]
    fn test_handler_is_send_sync() {
        let registry = CommandRegistry::from_handlers(vec![Fixed::new("ping")]).unwrap();
        let handler = registry.lookup("ping").unwrap();

        let handle = std::thread::spawn(move || handler.spec().description.clone());
        assert_eq!(handle.join().unwrap(), "ping command");
    }
}
