//! Loopback encryption engine for development.
//!
//! Payloads are the plaintext bytes; nothing here is confidential. Trust is
//! simulated so the untrusted-device flow can be exercised from the console.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::application::errors::EngineError;
use crate::domain::entities::{Address, DeviceId, EncryptedPayload};
use crate::domain::traits::CryptoEngine;

#[derive(Default)]
pub struct LoopbackEngine {
    untrusted: Mutex<HashMap<Address, DeviceId>>,
}

impl LoopbackEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `device` of `address` as untrusted until a forced-trust decrypt
    pub fn with_untrusted(self, address: &Address, device: DeviceId) -> Self {
        self.untrusted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(address.bare(), device);
        self
    }
}

#[async_trait]
impl CryptoEngine for LoopbackEngine {
    async fn decrypt_message(
        &self,
        payload: &EncryptedPayload,
        from: &Address,
        allow_untrusted: bool,
    ) -> Result<Vec<u8>, EngineError> {
        let mut untrusted = self.untrusted.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(device) = untrusted.get(&from.bare()).copied() {
            if !allow_untrusted {
                return Err(EngineError::UntrustedDevice(device));
            }
            tracing::info!("Trusting device {} of {}", device, from.bare());
            untrusted.remove(&from.bare());
        }

        if payload.as_bytes().is_empty() {
            return Err(EngineError::MissingOwnKey);
        }
        Ok(payload.as_bytes().to_vec())
    }

    async fn encrypt_message(&self, plaintext: &str, _to: &Address) -> Result<EncryptedPayload, EngineError> {
        Ok(EncryptedPayload(plaintext.as_bytes().to_vec()))
    }
}
