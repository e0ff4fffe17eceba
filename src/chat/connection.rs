//! Live connection tracking.
//!
//! A [`Connection`] is the relay's handle to one client transport. Frames
//! written to it land in a bounded buffer that the connection's socket
//! writer drains, so the relay never blocks on a slow client.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

/// Opaque identifier of a live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Create a new random connection ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Failure to hand a frame to a connection.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteError {
    /// The transport side has gone away.
    #[error("connection closed")]
    Closed,
    /// The client is not draining its frames fast enough.
    #[error("outbound buffer full")]
    Full,
}

/// Handle to a client transport.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    tx: mpsc::Sender<String>,
}

impl Connection {
    /// Create a connection with room for `buffer` pending frames.
    ///
    /// Returns the handle and the receiving end that the transport
    /// writer drains.
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(buffer);
        let connection = Self {
            id: ConnectionId::new(),
            tx,
        };
        (connection, rx)
    }

    /// Get the connection ID.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue a frame for the transport writer without waiting.
    pub fn write(&self, frame: String) -> Result<(), WriteError> {
        self.tx.try_send(frame).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => WriteError::Full,
            mpsc::error::TrySendError::Closed(_) => WriteError::Closed,
        })
    }

    /// Check whether the transport writer has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Set of all live connections, independent of room membership.
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<ConnectionId, Connection>>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a connection.
    pub async fn register(&self, connection: Connection) {
        self.connections
            .write()
            .await
            .insert(connection.id(), connection);
    }

    /// Unregister a connection.
    ///
    /// Returns true if the connection was registered. Dropping the last
    /// handle closes the transport writer.
    pub async fn unregister(&self, id: ConnectionId) -> bool {
        self.connections.write().await.remove(&id).is_some()
    }

    /// Get a connection by ID.
    pub async fn get(&self, id: ConnectionId) -> Option<Connection> {
        self.connections.read().await.get(&id).cloned()
    }

    /// Check if a connection is registered.
    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.connections.read().await.contains_key(&id)
    }

    /// Snapshot of all registered connections.
    pub async fn snapshot(&self) -> Vec<Connection> {
        self.connections.read().await.values().cloned().collect()
    }

    /// Get the number of live connections.
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Check if no connections are registered.
    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
