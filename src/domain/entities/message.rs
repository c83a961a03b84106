use super::Address;
use chrono::{DateTime, Utc};

/// Device identifier assigned by the encryption engine
pub type DeviceId = u32;

/// Kind of a message stanza
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Chat,
    Normal,
    GroupChat,
    Headline,
    Error,
}

impl MessageKind {
    pub fn as_str(&self) -> &str {
        match self {
            MessageKind::Chat => "chat",
            MessageKind::Normal => "normal",
            MessageKind::GroupChat => "groupchat",
            MessageKind::Headline => "headline",
            MessageKind::Error => "error",
        }
    }

    /// Only direct chats and normal messages are handled by the bot
    pub fn is_supported(&self) -> bool {
        matches!(self, MessageKind::Chat | MessageKind::Normal)
    }
}

/// Opaque end-to-end encrypted payload, produced and consumed by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload(pub Vec<u8>);

impl EncryptedPayload {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// A received message stanza
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub id: String,
    pub from: Address,
    pub kind: MessageKind,
    pub body: String,
    pub encrypted: Option<EncryptedPayload>,
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    pub fn new(from: Address, kind: MessageKind, body: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            from,
            kind,
            body: body.into(),
            encrypted: None,
            received_at: Utc::now(),
        }
    }

    pub fn chat(from: Address, body: impl Into<String>) -> Self {
        Self::new(from, MessageKind::Chat, body)
    }

    pub fn with_payload(mut self, payload: EncryptedPayload) -> Self {
        self.encrypted = Some(payload);
        self
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted.is_some()
    }
}

/// How a reply body travels to its recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encryption {
    Plaintext,
    Encrypted,
}

/// A reply decided by the pipeline, not yet handed to the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundReply {
    pub to: Address,
    pub kind: MessageKind,
    pub body: String,
    pub encryption: Encryption,
}

impl OutboundReply {
    /// Reply to `inbound`, mirroring its kind
    pub fn to(inbound: &InboundMessage, body: impl Into<String>, encryption: Encryption) -> Self {
        Self {
            to: inbound.from.clone(),
            kind: inbound.kind,
            body: body.into(),
            encryption,
        }
    }

    pub fn is_encrypted(&self) -> bool {
        self.encryption == Encryption::Encrypted
    }
}

/// Wire-ready content of an outbound stanza
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Plain(String),
    Encrypted(EncryptedPayload),
}

/// Sealed reply handed to the transport by value; sent at most once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundStanza {
    pub to: Address,
    pub kind: MessageKind,
    pub payload: Payload,
}
