//! Command parser - Splits message bodies into command invocations

/// Default command prefix
pub const DEFAULT_PREFIX: char = '!';

/// Parsed message body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedInput {
    NotACommand,
    Command { name: String, args: Vec<String> },
}

impl ParsedInput {
    pub fn is_command(&self) -> bool {
        matches!(self, ParsedInput::Command { .. })
    }
}

/// Parses text bodies using a single-character command prefix
#[derive(Debug, Clone)]
pub struct CommandParser {
    prefix: char,
}

impl CommandParser {
    pub fn new(prefix: char) -> Self {
        Self { prefix }
    }

    pub fn prefix(&self) -> char {
        self.prefix
    }

    /// Parse a message body. Never fails.
    ///
    /// A bare prefix yields an empty command name, which no handler can be
    /// registered under.
    pub fn parse(&self, body: &str) -> ParsedInput {
        let Some(rest) = body.strip_prefix(self.prefix) else {
            return ParsedInput::NotACommand;
        };

        let mut parts = rest.split_whitespace().map(str::to_string);
        let name = parts.next().unwrap_or_default();
        let args = parts.collect();

        ParsedInput::Command { name, args }
    }
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}
