//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::application::errors::ConfigError;
use crate::application::messaging::DEFAULT_PREFIX;
use crate::domain::entities::{Address, Credential};

/// Bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub account: AccountConfig,
    #[serde(default)]
    pub bot: BotConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AccountConfig {
    pub jid: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    pub prefix: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "omemo-echo-bot".to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    /// Write a template with empty credentials for the operator to fill in
    pub fn write_template(path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = serde_yaml::to_string(&Config::default())
            .map_err(|e| ConfigError::Parse(format!("Failed to render config: {}", e)))?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Overlay `XMPP_JID`, `XMPP_PASSWORD` and `BOT_PREFIX` from the environment
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(jid) = lookup("XMPP_JID") {
            self.account.jid = jid;
        }
        if let Some(password) = lookup("XMPP_PASSWORD") {
            self.account.password = password;
        }
        if let Some(prefix) = lookup("BOT_PREFIX") {
            self.bot.prefix = prefix;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.address()?;
        self.credential()?;
        self.prefix()?;
        Ok(())
    }

    pub fn address(&self) -> Result<Address, ConfigError> {
        if self.account.jid.trim().is_empty() {
            return Err(ConfigError::MissingField("account.jid".to_string()));
        }
        Address::parse(&self.account.jid)
    }

    pub fn credential(&self) -> Result<Credential, ConfigError> {
        if self.account.password.is_empty() {
            return Err(ConfigError::MissingField("account.password".to_string()));
        }
        Ok(Credential::new(self.account.password.clone()))
    }

    /// The command prefix, which must be a single non-whitespace character
    pub fn prefix(&self) -> Result<char, ConfigError> {
        let mut chars = self.bot.prefix.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_whitespace() => Ok(c),
            _ => Err(ConfigError::InvalidValue(format!(
                "bot.prefix must be a single character, got {:?}",
                self.bot.prefix
            ))),
        }
    }
}

/// Log filter directives: a non-empty `RUST_LOG` wins, otherwise `debug`
/// with `--verbose` and `info` without.
pub fn log_directives(verbose: bool, rust_log: Option<&str>) -> String {
    match rust_log.map(str::trim) {
        Some(directives) if !directives.is_empty() => directives.to_string(),
        _ if verbose => "debug".to_string(),
        _ => "info".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
account:
  jid: bot@example.org/desk
  password: secret
bot:
  name: tester
  prefix: "."
"#;

    #[test]
    fn parses_and_validates_yaml() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        config.validate().unwrap();

        assert_eq!(config.address().unwrap().bare().to_string(), "bot@example.org");
        assert_eq!(config.credential().unwrap().expose(), "secret");
        assert_eq!(config.prefix().unwrap(), '.');
        assert_eq!(config.bot.name, "tester");
    }

    #[test]
    fn bot_section_is_optional() {
        let config = Config::from_yaml("account:\n  jid: a@b.c\n  password: x\n").unwrap();
        assert_eq!(config.prefix().unwrap(), '!');
        assert_eq!(config.bot.name, "omemo-echo-bot");
    }

    #[test]
    fn default_template_fails_validation() {
        let config = Config::default();
        assert!(matches!(config.validate(), Err(ConfigError::MissingField(ref f)) if f == "account.jid"));

        let rendered = serde_yaml::to_string(&config).unwrap();
        let reparsed = Config::from_yaml(&rendered).unwrap();
        assert_eq!(reparsed.bot.prefix, "!");
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = Config::from_yaml(SAMPLE).unwrap();
        config.bot.prefix = "!!".to_string();
        assert!(matches!(config.prefix(), Err(ConfigError::InvalidValue(_))));
        config.bot.prefix = " ".to_string();
        assert!(config.prefix().is_err());
        config.bot.prefix = String::new();
        assert!(config.prefix().is_err());

        let mut config = Config::from_yaml(SAMPLE).unwrap();
        config.account.password.clear();
        assert!(matches!(config.validate(), Err(ConfigError::MissingField(_))));

        let mut config = Config::from_yaml(SAMPLE).unwrap();
        config.account.jid = "not-an-address".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        assert!(matches!(Config::from_yaml("account: [1, 2"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn overrides_replace_file_values() {
        let config = Config::from_yaml(SAMPLE).unwrap().with_overrides(|key| match key {
            "XMPP_JID" => Some("other@example.net".to_string()),
            "BOT_PREFIX" => Some("#".to_string()),
            _ => None,
        });

        assert_eq!(config.account.jid, "other@example.net");
        assert_eq!(config.account.password, "secret");
        assert_eq!(config.prefix().unwrap(), '#');
    }

    #[test]
    fn rust_log_overrides_default_level() {
        assert_eq!(log_directives(false, None), "info");
        assert_eq!(log_directives(true, None), "debug");
        assert_eq!(log_directives(false, Some("warn")), "warn");
        assert_eq!(log_directives(true, Some("omemo_echo_bot=trace")), "omemo_echo_bot=trace");
        assert_eq!(log_directives(true, Some("  ")), "debug");
    }
}
