use async_trait::async_trait;

use crate::application::errors::EngineError;
use crate::domain::entities::{Address, EncryptedPayload, InboundMessage};

/// End-to-end encryption engine (OMEMO or equivalent).
///
/// Key agreement, ratcheting and trust storage all live behind this trait.
#[async_trait]
pub trait CryptoEngine: Send + Sync {
    /// Whether `message` carries an encrypted payload this engine understands
    fn is_encrypted(&self, message: &InboundMessage) -> bool {
        message.is_encrypted()
    }

    /// Decrypt a payload sent by `from`.
    ///
    /// With `allow_untrusted` set, devices that are untrusted or undecided are
    /// accepted instead of reported.
    async fn decrypt_message(
        &self,
        payload: &EncryptedPayload,
        from: &Address,
        allow_untrusted: bool,
    ) -> Result<Vec<u8>, EngineError>;

    /// Encrypt `plaintext` for every known device of `to`
    async fn encrypt_message(&self, plaintext: &str, to: &Address) -> Result<EncryptedPayload, EngineError>;
}
