use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use crate::application::errors::TransportError;
use crate::domain::entities::{Address, ConnectionState, InboundMessage, OutboundStanza};

/// Transport trait - abstraction for the chat protocol connection
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open the connection and start delivering events through `handle`.
    ///
    /// Implementations spawn their own reader and return once the connection
    /// attempt is under way. Dropping every clone of `handle` ends the session.
    async fn connect(&self, handle: SessionHandle) -> Result<(), TransportError>;

    /// Send a sealed stanza
    async fn send(&self, stanza: OutboundStanza) -> Result<(), TransportError>;

    /// Announce availability to contacts
    async fn send_presence(&self) -> Result<(), TransportError>;

    /// Fetch the contact list
    async fn get_roster(&self) -> Result<Vec<Address>, TransportError>;
}

/// Events delivered by the transport, processed in arrival order
#[derive(Debug, Clone)]
pub enum SessionEvent {
    SessionStart,
    Message(InboundMessage),
    Disconnected,
    /// The transport is reconnecting after a disconnect
    Reconnecting,
}

/// Callback surface handed to the transport on connect
#[derive(Clone)]
pub struct SessionHandle {
    events: mpsc::Sender<SessionEvent>,
    state: Arc<watch::Sender<ConnectionState>>,
}

impl SessionHandle {
    pub fn new(events: mpsc::Sender<SessionEvent>, state: Arc<watch::Sender<ConnectionState>>) -> Self {
        Self { events, state }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub async fn session_started(&self) -> Result<(), TransportError> {
        self.emit(SessionEvent::SessionStart).await
    }

    pub async fn message(&self, message: InboundMessage) -> Result<(), TransportError> {
        self.emit(SessionEvent::Message(message)).await
    }

    /// Report a lost connection.
    ///
    /// The state flips immediately so an in-flight pipeline run is aborted
    /// before the queued event is seen.
    pub async fn disconnected(&self) -> Result<(), TransportError> {
        transition(&self.state, ConnectionState::Disconnected);
        self.emit(SessionEvent::Disconnected).await
    }

    /// Re-enter `Connecting` after a disconnect (transport reconnect policy)
    pub async fn reconnecting(&self) -> Result<(), TransportError> {
        self.emit(SessionEvent::Reconnecting).await
    }

    async fn emit(&self, event: SessionEvent) -> Result<(), TransportError> {
        self.events
            .send(event)
            .await
            .map_err(|_| TransportError::Connection("session controller has stopped".to_string()))
    }
}

/// Apply a state transition if the state machine allows it
pub fn transition(state: &watch::Sender<ConnectionState>, next: ConnectionState) -> bool {
    state.send_if_modified(|current| {
        if current.can_transition_to(next) {
            tracing::debug!("Session state {} -> {}", current, next);
            *current = next;
            true
        } else {
            false
        }
    })
}
