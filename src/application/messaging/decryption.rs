//! Decryption adapter - Classifies engine results into a closed set of outcomes

use std::sync::Arc;

use crate::application::errors::EngineError;
use crate::domain::entities::{DeviceId, InboundMessage};
use crate::domain::traits::CryptoEngine;

/// Outcome of one decryption attempt. Exactly one variant holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecryptionOutcome {
    PlainOk(String),
    MissingOwnKey,
    NoSession,
    Untrusted(DeviceId),
    Undecided(DeviceId),
    PrepareFailed,
    OtherError(String),
}

impl DecryptionOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, DecryptionOutcome::PlainOk(_))
    }

    /// Device that blocked decryption on trust grounds, if any
    pub fn untrusted_device(&self) -> Option<DeviceId> {
        match self {
            DecryptionOutcome::Untrusted(d) | DecryptionOutcome::Undecided(d) => Some(*d),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DecryptionOutcome::PlainOk(_) => "plain-ok",
            DecryptionOutcome::MissingOwnKey => "missing-own-key",
            DecryptionOutcome::NoSession => "no-session",
            DecryptionOutcome::Untrusted(_) => "untrusted",
            DecryptionOutcome::Undecided(_) => "undecided",
            DecryptionOutcome::PrepareFailed => "prepare-failed",
            DecryptionOutcome::OtherError(_) => "other-error",
        }
    }
}

impl From<EngineError> for DecryptionOutcome {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::MissingOwnKey => DecryptionOutcome::MissingOwnKey,
            EngineError::NoSession => DecryptionOutcome::NoSession,
            EngineError::UntrustedDevice(d) => DecryptionOutcome::Untrusted(d),
            EngineError::UndecidedDevice(d) => DecryptionOutcome::Undecided(d),
            EngineError::PrepareFailed => DecryptionOutcome::PrepareFailed,
            EngineError::Other(detail) => DecryptionOutcome::OtherError(detail),
        }
    }
}

/// Wraps the engine's decrypt call
#[derive(Clone)]
pub struct DecryptionAdapter {
    engine: Arc<dyn CryptoEngine>,
}

impl DecryptionAdapter {
    pub fn new(engine: Arc<dyn CryptoEngine>) -> Self {
        Self { engine }
    }

    /// Classify the decryption of `inbound`.
    ///
    /// Messages the engine does not consider encrypted pass through as
    /// `PlainOk` with their body unchanged.
    pub async fn decrypt(&self, inbound: &InboundMessage, allow_untrusted: bool) -> DecryptionOutcome {
        if !self.engine.is_encrypted(inbound) {
            return DecryptionOutcome::PlainOk(inbound.body.clone());
        }

        let Some(payload) = inbound.encrypted.as_ref() else {
            return DecryptionOutcome::OtherError("encrypted message carries no payload".to_string());
        };

        match self.engine.decrypt_message(payload, &inbound.from, allow_untrusted).await {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(text) => DecryptionOutcome::PlainOk(text),
                Err(e) => DecryptionOutcome::OtherError(format!("decrypted body is not UTF-8: {}", e)),
            },
            Err(e) => e.into(),
        }
    }
}
