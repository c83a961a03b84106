//! Message pipeline - Decrypt, interpret, reply

use std::sync::Arc;

use super::decryption::{DecryptionAdapter, DecryptionOutcome};
use super::parser::{CommandParser, ParsedInput};
use super::reply::ReplyChannelSelector;
use crate::application::errors::BotError;
use crate::domain::entities::{
    CommandRegistry, Dispatch, InboundMessage, OutboundReply, OutboundStanza, Payload,
};
use crate::domain::traits::{CryptoEngine, Transport};

/// Forced-trust decryption attempts allowed after an untrusted/undecided device
const MAX_TRUST_RETRIES: usize = 1;

/// Takes one inbound message from decryption through to the reply send
pub struct MessagePipeline {
    decryptor: DecryptionAdapter,
    parser: CommandParser,
    registry: Arc<CommandRegistry>,
    selector: ReplyChannelSelector,
    engine: Arc<dyn CryptoEngine>,
    transport: Arc<dyn Transport>,
}

impl MessagePipeline {
    pub fn new(
        parser: CommandParser,
        registry: Arc<CommandRegistry>,
        engine: Arc<dyn CryptoEngine>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            decryptor: DecryptionAdapter::new(engine.clone()),
            parser,
            registry,
            selector: ReplyChannelSelector::new(),
            engine,
            transport,
        }
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Process one inbound message.
    ///
    /// Returns `Err(BotError::Decryption)` for unclassified engine failures,
    /// after the sender has been told. Send failures are logged, not returned.
    pub async fn process(&self, inbound: &InboundMessage) -> Result<(), BotError> {
        let mut trust_retries = 0;

        loop {
            let allow_untrusted = trust_retries > 0;
            let outcome = self.decryptor.decrypt(inbound, allow_untrusted).await;
            tracing::debug!(
                "[{}] from {} decryption: {} (allow_untrusted={})",
                inbound.id,
                inbound.from,
                outcome.label(),
                allow_untrusted
            );

            if let Some(device) = outcome.untrusted_device() {
                if trust_retries >= MAX_TRUST_RETRIES {
                    tracing::warn!(
                        "[{}] device {} of {} still rejected after forced trust, giving up",
                        inbound.id,
                        device,
                        inbound.from
                    );
                    return Ok(());
                }
            }

            let dispatch = match &outcome {
                DecryptionOutcome::PlainOk(text) => self.interpret(text),
                _ => None,
            };

            if let Some(reply) = self.selector.select(inbound, &outcome, dispatch.as_ref()) {
                if let Err(e) = self.deliver(reply).await {
                    tracing::error!("[{}] Failed to send reply to {}: {}", inbound.id, inbound.from, e);
                }
            }

            match outcome {
                DecryptionOutcome::Untrusted(_) | DecryptionOutcome::Undecided(_) => {
                    trust_retries += 1;
                }
                DecryptionOutcome::OtherError(detail) => return Err(BotError::Decryption(detail)),
                _ => return Ok(()),
            }
        }
    }

    fn interpret(&self, text: &str) -> Option<Dispatch> {
        match self.parser.parse(text) {
            ParsedInput::NotACommand => None,
            ParsedInput::Command { name, args } => {
                tracing::debug!("Command: {} with args: {:?}", name, args);
                Some(self.registry.dispatch(&name, &args))
            }
        }
    }

    /// Seal `reply` and hand it to the transport.
    ///
    /// An encrypted reply that cannot be sealed is dropped, never downgraded.
    async fn deliver(&self, reply: OutboundReply) -> Result<(), BotError> {
        let payload = if reply.is_encrypted() {
            Payload::Encrypted(self.engine.encrypt_message(&reply.body, &reply.to).await?)
        } else {
            Payload::Plain(reply.body)
        };

        self.transport
            .send(OutboundStanza {
                to: reply.to,
                kind: reply.kind,
                payload,
            })
            .await?;
        Ok(())
    }
}
