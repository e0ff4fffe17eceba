//! Shared application state.

use std::sync::Arc;

use crate::chat::{ConnectionRegistry, Dispatcher, Relay, RoomDirectory, SessionTokenStore};
use crate::config::RelayConfig;

/// State shared by every HTTP and WebSocket handler.
pub struct AppState {
    /// All live connections.
    pub registry: Arc<ConnectionRegistry>,
    /// All rooms.
    pub directory: Arc<RoomDirectory>,
    /// Issued session tokens.
    pub tokens: Arc<SessionTokenStore>,
    /// Protocol engine.
    pub dispatcher: Dispatcher,
    /// Outbound buffer size for new connections.
    pub connection_buffer: usize,
}

impl AppState {
    /// Create fresh chat state and start the relay task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: &RelayConfig) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let directory = Arc::new(RoomDirectory::new());
        let tokens = Arc::new(SessionTokenStore::new());

        let (relay, _) = Relay::spawn(
            Arc::clone(&registry),
            Arc::clone(&directory),
            config.queue_capacity,
        );
        let dispatcher = Dispatcher::new(Arc::clone(&directory), Arc::clone(&tokens), relay);

        Self {
            registry,
            directory,
            tokens,
            dispatcher,
            connection_buffer: config.connection_buffer,
        }
    }
}
