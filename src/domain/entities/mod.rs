//! Domain entities - Core business objects with no external dependencies

pub mod address;
pub mod command;
pub mod message;
pub mod session;

pub use address::Address;
pub use command::{Command, CommandHandler, CommandRegistry, Dispatch, FALLBACK_COMMAND};
pub use message::{
    DeviceId, EncryptedPayload, Encryption, InboundMessage, MessageKind, OutboundReply,
    OutboundStanza, Payload,
};
pub use session::{ConnectionState, Credential, Session};
