//! Scripted collaborators shared by the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use tokio::sync::Notify;

use omemo_echo_bot::application::errors::{EngineError, TransportError};
use omemo_echo_bot::domain::entities::{
    Address, EncryptedPayload, InboundMessage, MessageKind, OutboundStanza, Payload,
};
use omemo_echo_bot::domain::traits::{CryptoEngine, SessionHandle, Transport};

static INIT: Once = Once::new();

pub fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn addr(s: &str) -> Address {
    Address::parse(s).expect("valid test address")
}

/// Encrypted chat message whose payload the scripted engine ignores
pub fn encrypted_from(sender: &str) -> InboundMessage {
    InboundMessage::chat(addr(sender), "[encrypted]").with_payload(EncryptedPayload(vec![0xAB]))
}

pub fn plain_from(sender: &str, body: &str) -> InboundMessage {
    InboundMessage::chat(addr(sender), body)
}

pub fn with_kind(mut message: InboundMessage, kind: MessageKind) -> InboundMessage {
    message.kind = kind;
    message
}

/// Prefix the scripted engine puts on "encrypted" replies
pub const SEALED: &str = "sealed:";

pub enum Decrypt {
    Return(Result<Vec<u8>, EngineError>),
    /// Never completes
    Hang,
}

pub fn plaintext(text: &str) -> Decrypt {
    Decrypt::Return(Ok(text.as_bytes().to_vec()))
}

pub fn failure(err: EngineError) -> Decrypt {
    Decrypt::Return(Err(err))
}

/// Engine answering decrypt calls from a queue
#[derive(Default)]
pub struct ScriptedEngine {
    script: Mutex<VecDeque<Decrypt>>,
    calls: Mutex<Vec<bool>>,
    fail_encrypt: bool,
    pub entered: Arc<Notify>,
}

impl ScriptedEngine {
    pub fn new(script: Vec<Decrypt>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Default::default()
        }
    }

    pub fn failing_encrypt(mut self) -> Self {
        self.fail_encrypt = true;
        self
    }

    /// `allow_untrusted` flag of every decrypt call, in order
    pub fn calls(&self) -> Vec<bool> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CryptoEngine for ScriptedEngine {
    async fn decrypt_message(
        &self,
        _payload: &EncryptedPayload,
        _from: &Address,
        allow_untrusted: bool,
    ) -> Result<Vec<u8>, EngineError> {
        self.calls.lock().unwrap().push(allow_untrusted);
        let next = self.script.lock().unwrap().pop_front();
        self.entered.notify_one();

        match next {
            Some(Decrypt::Return(result)) => result,
            Some(Decrypt::Hang) => std::future::pending().await,
            None => Err(EngineError::Other("decrypt script exhausted".to_string())),
        }
    }

    async fn encrypt_message(&self, plaintext: &str, _to: &Address) -> Result<EncryptedPayload, EngineError> {
        if self.fail_encrypt {
            return Err(EngineError::NoSession);
        }
        Ok(EncryptedPayload(format!("{}{}", SEALED, plaintext).into_bytes()))
    }
}

/// What the scripted transport does after `connect`
pub enum Step {
    Start,
    Message(InboundMessage),
    Disconnect,
    Reconnect,
    /// Wait until the engine has been entered
    AwaitDecrypt(Arc<Notify>),
}

/// Transport recording everything sent through it
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<OutboundStanza>>,
    presence: Mutex<usize>,
    roster_requests: Mutex<usize>,
    connects: Mutex<usize>,
    script: Mutex<Vec<Step>>,
    roster_error: Option<fn() -> TransportError>,
    fail_connect: bool,
    fail_presence: bool,
    fail_send: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scripted(script: Vec<Step>) -> Self {
        Self {
            script: Mutex::new(script),
            ..Default::default()
        }
    }

    pub fn with_roster_error(mut self, make_error: fn() -> TransportError) -> Self {
        self.roster_error = Some(make_error);
        self
    }

    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    pub fn failing_presence(mut self) -> Self {
        self.fail_presence = true;
        self
    }

    pub fn failing_send(mut self) -> Self {
        self.fail_send = true;
        self
    }

    pub fn sent(&self) -> Vec<OutboundStanza> {
        self.sent.lock().unwrap().clone()
    }

    /// Sent bodies, with encrypted ones shown as `sealed:<plaintext>`
    pub fn bodies(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .map(|stanza| match stanza.payload {
                Payload::Plain(body) => body,
                Payload::Encrypted(payload) => String::from_utf8_lossy(payload.as_bytes()).into_owned(),
            })
            .collect()
    }

    pub fn presence_count(&self) -> usize {
        *self.presence.lock().unwrap()
    }

    pub fn roster_requests(&self) -> usize {
        *self.roster_requests.lock().unwrap()
    }

    pub fn connect_count(&self) -> usize {
        *self.connects.lock().unwrap()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn connect(&self, handle: SessionHandle) -> Result<(), TransportError> {
        *self.connects.lock().unwrap() += 1;
        if self.fail_connect {
            return Err(TransportError::Connection("connection refused".to_string()));
        }

        let script = std::mem::take(&mut *self.script.lock().unwrap());
        tokio::spawn(async move {
            for step in script {
                let delivered = match step {
                    Step::Start => handle.session_started().await,
                    Step::Message(message) => handle.message(message).await,
                    Step::Disconnect => handle.disconnected().await,
                    Step::Reconnect => handle.reconnecting().await,
                    Step::AwaitDecrypt(entered) => {
                        entered.notified().await;
                        Ok(())
                    }
                };
                if delivered.is_err() {
                    return;
                }
            }
        });
        Ok(())
    }

    async fn send(&self, stanza: OutboundStanza) -> Result<(), TransportError> {
        if self.fail_send {
            return Err(TransportError::Send("stream closed".to_string()));
        }
        self.sent.lock().unwrap().push(stanza);
        Ok(())
    }

    async fn send_presence(&self) -> Result<(), TransportError> {
        *self.presence.lock().unwrap() += 1;
        if self.fail_presence {
            return Err(TransportError::Send("presence rejected".to_string()));
        }
        Ok(())
    }

    async fn get_roster(&self) -> Result<Vec<Address>, TransportError> {
        *self.roster_requests.lock().unwrap() += 1;
        match self.roster_error {
            Some(make_error) => Err(make_error()),
            None => Ok(Vec::new()),
        }
    }
}
