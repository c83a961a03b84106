//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Adapters: Transport integrations (console)
//! - Crypto: Development encryption engine

pub mod adapters;
pub mod config;
pub mod crypto;
