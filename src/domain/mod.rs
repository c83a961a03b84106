//! Domain layer - Core business objects and collaborator abstractions
//! 
//! This layer contains:
//! - Entities: Core business objects (Address, Message, Command, Session)
//! - Traits: Abstractions for external collaborators (Transport, CryptoEngine)

pub mod entities;
pub mod traits;
