use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::application::errors::ConfigError;

static ADDRESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<local>[^@/\s]+)@(?P<domain>[^@/\s]+)(?:/(?P<resource>.+))?$")
        .expect("address pattern is a valid regex")
});

/// Account address of a chat participant (`local@domain[/resource]`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    local: String,
    domain: String,
    resource: Option<String>,
}

impl Address {
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let caps = ADDRESS_RE
            .captures(input.trim())
            .ok_or_else(|| ConfigError::InvalidValue(format!("not a valid address: {:?}", input)))?;

        Ok(Self {
            local: caps["local"].to_string(),
            domain: caps["domain"].to_string(),
            resource: caps.name("resource").map(|r| r.as_str().to_string()),
        })
    }

    pub fn local(&self) -> &str {
        &self.local
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    /// Address without the resource part
    pub fn bare(&self) -> Address {
        Self {
            local: self.local.clone(),
            domain: self.domain.clone(),
            resource: None,
        }
    }
}

impl FromStr for Address {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.local, self.domain)?;
        if let Some(ref resource) = self.resource {
            write!(f, "/{}", resource)?;
        }
        Ok(())
    }
}
