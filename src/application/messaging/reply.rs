//! Reply channel selector - Decides what to send back and how

use super::decryption::DecryptionOutcome;
use crate::domain::entities::{DeviceId, Dispatch, Encryption, InboundMessage, OutboundReply};

pub const MISSING_OWN_KEY_REPLY: &str = "Error: Message not encrypted for me.";
pub const NO_SESSION_REPLY: &str = "Error: Message uses an encrypted session I don't know about.";
pub const PREPARE_FAILED_REPLY: &str = "Error: I was not able to decrypt the message.";
pub const COMMAND_FAULT_REPLY: &str = "Error: Something went wrong while running that command.";

pub fn untrusted_reply(device: DeviceId) -> String {
    format!("Error: Your device '{}' is not in my trusted devices.", device)
}

pub fn other_error_reply(detail: &str) -> String {
    format!("Error: An error occurred while attempting decryption.\n{}", detail)
}

/// Maps a decryption outcome (and dispatch result) to at most one reply
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplyChannelSelector;

impl ReplyChannelSelector {
    pub fn new() -> Self {
        Self
    }

    /// `dispatch` is `None` when the decrypted body was not a command.
    pub fn select(
        &self,
        inbound: &InboundMessage,
        outcome: &DecryptionOutcome,
        dispatch: Option<&Dispatch>,
    ) -> Option<OutboundReply> {
        let plain = |body: String| Some(OutboundReply::to(inbound, body, Encryption::Plaintext));
        let encrypted = |body: String| Some(OutboundReply::to(inbound, body, Encryption::Encrypted));

        match outcome {
            DecryptionOutcome::PlainOk(_) => {
                let body = match dispatch? {
                    Dispatch::Reply(text) => text.clone(),
                    Dispatch::Silent => return None,
                    Dispatch::Fault(_) => COMMAND_FAULT_REPLY.to_string(),
                };
                Some(OutboundReply::to(inbound, body, Self::mirror(inbound)))
            }
            DecryptionOutcome::MissingOwnKey => plain(MISSING_OWN_KEY_REPLY.to_string()),
            DecryptionOutcome::NoSession => encrypted(NO_SESSION_REPLY.to_string()),
            DecryptionOutcome::Untrusted(device) | DecryptionOutcome::Undecided(device) => {
                plain(untrusted_reply(*device))
            }
            DecryptionOutcome::PrepareFailed => plain(PREPARE_FAILED_REPLY.to_string()),
            DecryptionOutcome::OtherError(detail) => plain(other_error_reply(detail)),
        }
    }

    /// Command replies use the same channel the command arrived on
    fn mirror(inbound: &InboundMessage) -> Encryption {
        if inbound.is_encrypted() {
            Encryption::Encrypted
        } else {
            Encryption::Plaintext
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Address, EncryptedPayload, MessageKind};

    fn inbound() -> InboundMessage {
        InboundMessage::new(Address::parse("alice@example.org/laptop").unwrap(), MessageKind::Normal, "")
            .with_payload(EncryptedPayload(vec![0]))
    }

    fn select(outcome: DecryptionOutcome, dispatch: Option<Dispatch>) -> Option<OutboundReply> {
        ReplyChannelSelector::new().select(&inbound(), &outcome, dispatch.as_ref())
    }

    #[test]
    fn command_replies_are_encrypted_when_inbound_was() {
        let reply = select(DecryptionOutcome::PlainOk("!echo x".into()), Some(Dispatch::Reply("x".into()))).unwrap();
        assert_eq!(reply.body, "x");
        assert_eq!(reply.encryption, Encryption::Encrypted);
        assert_eq!(reply.kind, MessageKind::Normal);
        assert_eq!(reply.to.to_string(), "alice@example.org/laptop");
    }

    #[test]
    fn plaintext_inbound_gets_plaintext_command_reply() {
        let msg = InboundMessage::chat(Address::parse("bob@example.org").unwrap(), "!echo y");
        let reply = ReplyChannelSelector::new()
            .select(&msg, &DecryptionOutcome::PlainOk("!echo y".into()), Some(&Dispatch::Reply("y".into())))
            .unwrap();
        assert_eq!(reply.encryption, Encryption::Plaintext);
    }

    #[test]
    fn no_reply_cases() {
        assert!(select(DecryptionOutcome::PlainOk("hello".into()), None).is_none());
        assert!(select(DecryptionOutcome::PlainOk("!quiet".into()), Some(Dispatch::Silent)).is_none());
    }

    #[test]
    fn handler_fault_gets_generic_reply() {
        let reply = select(DecryptionOutcome::PlainOk("!bad".into()), Some(Dispatch::Fault("boom".into()))).unwrap();
        assert_eq!(reply.body, COMMAND_FAULT_REPLY);
        assert!(!reply.body.contains("boom"));
    }

    #[test]
    fn failure_table() {
        let cases = [
            (DecryptionOutcome::MissingOwnKey, MISSING_OWN_KEY_REPLY.to_string(), Encryption::Plaintext),
            (DecryptionOutcome::NoSession, NO_SESSION_REPLY.to_string(), Encryption::Encrypted),
            (DecryptionOutcome::Untrusted(42), untrusted_reply(42), Encryption::Plaintext),
            (DecryptionOutcome::Undecided(43), untrusted_reply(43), Encryption::Plaintext),
            (DecryptionOutcome::PrepareFailed, PREPARE_FAILED_REPLY.to_string(), Encryption::Plaintext),
            (
                DecryptionOutcome::OtherError("bad mac".into()),
                other_error_reply("bad mac"),
                Encryption::Plaintext,
            ),
        ];

        for (outcome, body, encryption) in cases {
            // Failures ignore any dispatch result
            let reply = select(outcome, Some(Dispatch::Reply("ignored".into()))).unwrap();
            assert_eq!(reply.body, body);
            assert_eq!(reply.encryption, encryption);
        }
        assert!(untrusted_reply(42).contains("'42'"));
        assert!(other_error_reply("bad mac").contains("bad mac"));
    }
}
