//! Message handling - Decryption, command parsing, reply selection

pub mod decryption;
pub mod parser;
pub mod pipeline;
pub mod reply;

pub use decryption::{DecryptionAdapter, DecryptionOutcome};
pub use parser::{CommandParser, ParsedInput, DEFAULT_PREFIX};
pub use pipeline::MessagePipeline;
pub use reply::ReplyChannelSelector;
