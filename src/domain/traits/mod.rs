//! Domain traits - Abstractions for the external collaborators

pub mod crypto;
pub mod transport;

pub use crypto::CryptoEngine;
pub use transport::{SessionEvent, SessionHandle, Transport};
