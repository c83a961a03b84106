use std::fmt;
use std::sync::Arc;

use super::{Address, CommandRegistry};

/// Connection state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Active,
    Disconnected,
}

impl ConnectionState {
    pub fn as_str(&self) -> &str {
        match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Active => "active",
            ConnectionState::Disconnected => "disconnected",
        }
    }

    /// Whether the state machine allows moving from `self` to `next`.
    ///
    /// `Disconnected` is terminal unless the transport reconnects.
    pub fn can_transition_to(&self, next: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (*self, next),
            (Idle, Connecting)
                | (Connecting, Active)
                | (Connecting, Disconnected)
                | (Active, Disconnected)
                | (Disconnected, Connecting)
        )
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account password. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// One authenticated connection to the server
#[derive(Debug, Clone)]
pub struct Session {
    pub identity: Address,
    pub credential: Credential,
    pub registry: Arc<CommandRegistry>,
}

impl Session {
    pub fn new(identity: Address, credential: Credential, registry: Arc<CommandRegistry>) -> Self {
        Self {
            identity,
            credential,
            registry,
        }
    }
}
