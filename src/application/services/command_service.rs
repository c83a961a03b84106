use std::sync::Arc;

use crate::application::errors::CommandError;
use crate::domain::entities::{Command, CommandRegistry};

/// Reply of the `ping` command
pub const PING_REPLY: &str = "Żyje!";

/// Joins the arguments with single spaces
pub fn echo(args: &[String]) -> Result<Option<String>, CommandError> {
    Ok(Some(args.join(" ")))
}

/// Service for registering the built-in commands
pub struct CommandService {
    registry: Arc<CommandRegistry>,
    prefix: char,
    bot_name: String,
}

impl CommandService {
    pub fn new(registry: Arc<CommandRegistry>, prefix: char, bot_name: impl Into<String>) -> Self {
        Self {
            registry,
            prefix,
            bot_name: bot_name.into(),
        }
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    pub fn register(&self, command: Command) -> Result<(), CommandError> {
        tracing::debug!("Registering command: {}", command.name);
        self.registry.register(command)
    }

    pub fn register_defaults(&self) -> Result<(), CommandError> {
        let prefix = self.prefix;

        self.register(
            Command::new("echo", echo)
                .with_description("Repeat the arguments back")
                .with_usage(format!("{}echo <text>", prefix)),
        )?;

        self.register(
            Command::new("ping", |_| Ok(Some(PING_REPLY.to_string())))
                .with_description("Check that the bot is alive"),
        )?;

        let version = format!("{} v{}", self.bot_name, env!("CARGO_PKG_VERSION"));
        self.register(
            Command::new("version", move |_| Ok(Some(version.clone())))
                .with_description("Show bot version"),
        )?;

        // Weak so the registry does not own a handler that owns the registry
        let registry = Arc::downgrade(&self.registry);
        self.register(
            Command::new("help", move |_| {
                let commands = registry.upgrade().map(|r| r.commands()).unwrap_or_default();
                Ok(Some(format_help(prefix, &commands)))
            })
            .with_description("Show available commands"),
        )?;

        Ok(())
    }
}

/// One line per command: usage (or `<prefix><name>`), then the description
fn format_help(prefix: char, commands: &[Command]) -> String {
    let mut help = "Available commands:".to_string();
    for cmd in commands {
        let usage = cmd
            .usage
            .clone()
            .unwrap_or_else(|| format!("{}{}", prefix, cmd.name));
        match &cmd.description {
            Some(desc) => help.push_str(&format!("\n{} - {}", usage, desc)),
            None => help.push_str(&format!("\n{}", usage)),
        }
    }
    help
}
