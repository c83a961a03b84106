//! Console adapter for development/testing
//!
//! Each stdin line is one inbound chat message: `[sender] body`. A body
//! starting with `omemo:` is delivered as an encrypted payload.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::application::errors::TransportError;
use crate::domain::entities::{Address, EncryptedPayload, InboundMessage, OutboundStanza, Payload};
use crate::domain::traits::{SessionHandle, Transport};

/// Marks a console body as an encrypted payload
pub const ENCRYPTED_MARKER: &str = "omemo:";

/// Body shown by clients that cannot decrypt
pub const ENCRYPTED_FALLBACK_BODY: &str = "I sent you an OMEMO encrypted message but your client doesn't seem to support that.";

/// Console transport adapter for local development
pub struct ConsoleTransport {
    default_peer: Address,
}

impl ConsoleTransport {
    pub fn new(default_peer: Address) -> Self {
        Self { default_peer }
    }

    /// Turn one console line into an inbound message
    pub fn parse_line(&self, line: &str) -> Option<InboundMessage> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (from, body) = match line.split_once(char::is_whitespace) {
            Some((first, rest)) if first.contains('@') => match Address::parse(first) {
                Ok(addr) => (addr, rest.trim_start()),
                Err(_) => (self.default_peer.clone(), line),
            },
            _ => (self.default_peer.clone(), line),
        };

        let message = match body.strip_prefix(ENCRYPTED_MARKER) {
            Some(secret) => InboundMessage::chat(from, ENCRYPTED_FALLBACK_BODY)
                .with_payload(EncryptedPayload(secret.trim_start().as_bytes().to_vec())),
            None => InboundMessage::chat(from, body),
        };
        Some(message)
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn connect(&self, handle: SessionHandle) -> Result<(), TransportError> {
        tracing::info!("Starting console transport (dev mode)");
        let reader = ConsoleTransport::new(self.default_peer.clone());

        tokio::spawn(async move {
            if handle.session_started().await.is_err() {
                return;
            }

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if line.trim() == "/quit" {
                            break;
                        }
                        let Some(message) = reader.parse_line(&line) else {
                            continue;
                        };
                        if handle.message(message).await.is_err() {
                            return;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!("Failed to read stdin: {}", e);
                        break;
                    }
                }
            }

            let _ = handle.disconnected().await;
        });

        Ok(())
    }

    async fn send(&self, stanza: OutboundStanza) -> Result<(), TransportError> {
        match stanza.payload {
            Payload::Plain(body) => println!("[BOT -> {}] {}", stanza.to, body),
            Payload::Encrypted(payload) => println!(
                "[BOT -> {}] {}{}",
                stanza.to,
                ENCRYPTED_MARKER,
                String::from_utf8_lossy(payload.as_bytes())
            ),
        }
        Ok(())
    }

    async fn send_presence(&self) -> Result<(), TransportError> {
        println!("[BOT] available");
        Ok(())
    }

    async fn get_roster(&self) -> Result<Vec<Address>, TransportError> {
        Ok(vec![self.default_peer.clone()])
    }
}
