//! Session controller - Drives one session through its lifecycle

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::application::errors::{BotError, TransportError};
use crate::application::messaging::{CommandParser, MessagePipeline};
use crate::domain::entities::{ConnectionState, InboundMessage, Session};
use crate::domain::traits::transport::transition;
use crate::domain::traits::{CryptoEngine, SessionEvent, SessionHandle, Transport};

/// Pending transport events before the transport is back-pressured
const EVENT_BUFFER: usize = 64;

/// Owns the session state machine and runs the message pipeline for every
/// inbound message, one at a time, in arrival order.
pub struct SessionController {
    session: Session,
    pipeline: MessagePipeline,
    transport: Arc<dyn Transport>,
    state: Arc<watch::Sender<ConnectionState>>,
}

impl SessionController {
    pub fn new(
        session: Session,
        parser: CommandParser,
        engine: Arc<dyn CryptoEngine>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let pipeline = MessagePipeline::new(parser, session.registry.clone(), engine, transport.clone());
        let (state, _) = watch::channel(ConnectionState::Idle);

        Self {
            session,
            pipeline,
            transport,
            state: Arc::new(state),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Watch state changes
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Connect and process events until the transport drops its handle
    pub async fn run(&self) -> Result<(), BotError> {
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        let handle = SessionHandle::new(events_tx, self.state.clone());

        if !transition(&self.state, ConnectionState::Connecting) {
            let state = self.state();
            tracing::warn!("Not connecting, session is already {}", state);
            return Err(TransportError::Connection(format!("session is already {}", state)).into());
        }
        tracing::info!("Connecting as {}", self.session.identity);

        if let Err(e) = self.transport.connect(handle).await {
            transition(&self.state, ConnectionState::Disconnected);
            tracing::error!("Failed to connect: {}", e);
            return Err(e.into());
        }

        self.process_events(events_rx).await;
        tracing::info!("Session for {} ended", self.session.identity);
        Ok(())
    }

    pub async fn process_events(&self, mut events: mpsc::Receiver<SessionEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
        }
    }

    pub async fn handle_event(&self, event: SessionEvent) {
        match event {
            SessionEvent::SessionStart => self.on_session_start().await,
            SessionEvent::Message(message) => self.on_message(message).await,
            SessionEvent::Disconnected => self.on_disconnect(),
            SessionEvent::Reconnecting => self.on_reconnecting(),
        }
    }

    async fn on_session_start(&self) {
        if !transition(&self.state, ConnectionState::Active) {
            tracing::warn!("Ignoring session start while {}", self.state());
            return;
        }
        tracing::info!("Session started for {}", self.session.identity);

        if let Err(e) = self.transport.send_presence().await {
            tracing::error!("Failed to send presence: {}", e);
        }

        match self.transport.get_roster().await {
            Ok(roster) => tracing::info!("Roster loaded with {} contacts", roster.len()),
            Err(TransportError::Iq { condition }) => {
                tracing::error!("There was an error getting the roster: {}", condition);
            }
            Err(TransportError::IqTimeout) => {
                tracing::error!("Server is taking too long to respond to the roster request");
            }
            Err(e) => tracing::error!("Failed to get roster: {}", e),
        }
    }

    async fn on_message(&self, message: InboundMessage) {
        let state = self.state();
        if state != ConnectionState::Active {
            tracing::debug!("[{}] Dropping message received while {}", message.id, state);
            return;
        }
        if !message.kind.is_supported() {
            tracing::debug!("[{}] Ignoring {} message", message.id, message.kind.as_str());
            return;
        }

        tracing::info!(
            "[{}] Processing {} message from {} (received {})",
            message.id,
            message.kind.as_str(),
            message.from,
            message.received_at.format("%H:%M:%S%.3f")
        );

        let mut state_rx = self.state.subscribe();
        tokio::select! {
            biased;
            _ = wait_disconnected(&mut state_rx) => {
                tracing::warn!("[{}] Disconnected, pending reply dropped", message.id);
            }
            result = self.pipeline.process(&message) => {
                if let Err(e) = result {
                    self.on_fault(&message, e);
                }
            }
        }
    }

    /// Session-level fault handler. Logs and keeps the session alive.
    fn on_fault(&self, message: &InboundMessage, err: BotError) {
        tracing::error!(
            "[{}] Fault while handling message from {}: {}",
            message.id,
            message.from,
            err
        );
    }

    fn on_disconnect(&self) {
        transition(&self.state, ConnectionState::Disconnected);
        tracing::info!("Disconnected from server");
    }

    fn on_reconnecting(&self) {
        if transition(&self.state, ConnectionState::Connecting) {
            tracing::info!("Reconnecting as {}", self.session.identity);
        } else {
            tracing::warn!("Ignoring reconnect while {}", self.state());
        }
    }
}

async fn wait_disconnected(state: &mut watch::Receiver<ConnectionState>) {
    let _ = state
        .wait_for(|s| *s == ConnectionState::Disconnected)
        .await;
}
