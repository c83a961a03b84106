//! omemo-echo-bot - an end-to-end encrypted chat command bot
//!
//! Inbound messages are decrypted, parsed as commands, dispatched through the
//! command registry and answered on the channel the failure policy selects.

pub mod application;
pub mod domain;
pub mod infrastructure;
