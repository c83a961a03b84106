//! Application layer errors

use thiserror::Error;

use crate::domain::entities::DeviceId;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Encryption error: {0}")]
    Engine(#[from] EngineError),

    /// Unclassified decryption failure, raised after the sender has been told.
    #[error("Decryption failed: {0}")]
    Decryption(String),
}

/// Command registration and execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Invalid command name: {0:?}")]
    InvalidName(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

/// Transport collaborator errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("IQ error: {condition}")]
    Iq { condition: String },

    #[error("Server is taking too long to respond")]
    IqTimeout,

    #[error("Send failed: {0}")]
    Send(String),
}

/// Failure kinds reported by the end-to-end encryption engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("no usable local key for this message")]
    MissingOwnKey,

    #[error("message references an unknown session")]
    NoSession,

    #[error("device {0} is not trusted")]
    UntrustedDevice(DeviceId),

    #[error("trust for device {0} is undecided")]
    UndecidedDevice(DeviceId),

    #[error("could not resolve encryption state")]
    PrepareFailed,

    #[error("{0}")]
    Other(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
