//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Services: Command registration and the session controller
//! - Errors: Domain-specific errors
//! - Messaging: Decryption, parsing, reply selection and the message pipeline

pub mod errors;
pub mod services;
pub mod messaging;
