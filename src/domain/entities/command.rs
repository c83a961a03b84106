use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

use crate::application::errors::CommandError;

/// Name of the reserved handler used for unknown commands
pub const FALLBACK_COMMAND: &str = "no_command_found";

/// Command handler function type.
///
/// Handlers are synchronous and must not perform I/O. `Ok(None)` means the
/// command deliberately produces no reply.
pub type CommandHandler =
    Arc<dyn Fn(&[String]) -> Result<Option<String>, CommandError> + Send + Sync>;

/// Represents a bot command
#[derive(Clone)]
pub struct Command {
    pub name: String,
    pub description: Option<String>,
    pub usage: Option<String>,
    pub handler: CommandHandler,
}

impl Command {
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&[String]) -> Result<Option<String>, CommandError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: None,
            usage: None,
            handler: Arc::new(handler),
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("usage", &self.usage)
            .finish_non_exhaustive()
    }
}

/// Result of running a command handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Reply(String),
    Silent,
    /// The handler failed or panicked
    Fault(String),
}

/// Command names are non-empty and made of letters only
pub fn is_valid_command_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(char::is_alphabetic)
}

/// Command registry for managing available commands.
///
/// The fallback entry lives outside the map so it can never be removed or
/// overwritten.
pub struct CommandRegistry {
    commands: RwLock<HashMap<String, Command>>,
    fallback: Command,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: RwLock::new(HashMap::new()),
            fallback: Command::new(FALLBACK_COMMAND, |_args| Ok(Some("No command found".to_string())))
                .with_description("Reply used for unknown commands"),
        }
    }

    pub fn register(&self, command: Command) -> Result<(), CommandError> {
        if !is_valid_command_name(&command.name) {
            return Err(CommandError::InvalidName(command.name));
        }

        let mut commands = self.commands.write().unwrap_or_else(PoisonError::into_inner);
        if commands.insert(command.name.clone(), command).is_some() {
            tracing::debug!("Overwrote existing command handler");
        }
        Ok(())
    }

    /// Remove a command, returning whether it was registered
    pub fn unregister(&self, name: &str) -> bool {
        if name == FALLBACK_COMMAND {
            return false;
        }
        self.commands
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .is_some()
    }

    pub fn resolve(&self, name: &str) -> CommandHandler {
        self.commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map(|cmd| cmd.handler.clone())
            .unwrap_or_else(|| self.fallback.handler.clone())
    }

    pub fn fallback(&self) -> CommandHandler {
        self.fallback.handler.clone()
    }

    /// Resolve `name` and run its handler with `args`.
    ///
    /// The lock is released before the handler runs, so handlers never block
    /// registration.
    pub fn dispatch(&self, name: &str, args: &[String]) -> Dispatch {
        let handler = self.resolve(name);

        match catch_unwind(AssertUnwindSafe(|| handler(args))) {
            Ok(Ok(Some(reply))) => Dispatch::Reply(reply),
            Ok(Ok(None)) => Dispatch::Silent,
            Ok(Err(e)) => {
                tracing::error!("Command '{}' failed: {}", name, e);
                Dispatch::Fault(e.to_string())
            }
            Err(panic) => {
                let detail = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "handler panicked".to_string());
                tracing::error!("Command '{}' panicked: {}", name, detail);
                Dispatch::Fault(detail)
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Registered command names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Snapshot of the registered commands, sorted by name
    pub fn commands(&self) -> Vec<Command> {
        let mut commands: Vec<Command> = self
            .commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        commands.sort_by(|a, b| a.name.cmp(&b.name));
        commands
    }

    pub fn len(&self) -> usize {
        self.commands.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.names())
            .finish()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
