//! Outbound message relay.
//!
//! All outbound events, from every connection task, go through one queue
//! and are written by one task in enqueue order. That task is the only
//! writer for every connection, so frames for a single connection never
//! interleave.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::connection::{Connection, ConnectionId, ConnectionRegistry};
use super::directory::RoomDirectory;
use super::event::ServerEvent;
use crate::{Result, RoomcastError};

/// Where an envelope should be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A single connection.
    Connection(ConnectionId),
    /// Every member of a room, resolved at delivery time.
    Room(String),
    /// Every registered connection.
    All,
}

/// An outbound event and its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Event to deliver.
    pub event: ServerEvent,
    /// Delivery target.
    pub target: Target,
}

impl Envelope {
    /// Envelope for a single connection.
    pub fn unicast(connection: ConnectionId, event: ServerEvent) -> Self {
        Self {
            event,
            target: Target::Connection(connection),
        }
    }

    /// Envelope for every member of a room.
    pub fn to_room(room_name: impl Into<String>, event: ServerEvent) -> Self {
        Self {
            event,
            target: Target::Room(room_name.into()),
        }
    }

    /// Envelope for every live connection.
    pub fn broadcast(event: ServerEvent) -> Self {
        Self {
            event,
            target: Target::All,
        }
    }
}

/// Producer handle for the relay queue.
///
/// Cheap to clone. The relay task stops once every handle is dropped.
#[derive(Clone)]
pub struct Relay {
    tx: mpsc::Sender<Envelope>,
}

impl Relay {
    /// Spawn the relay task.
    ///
    /// `capacity` bounds the queue; producers wait when it is full.
    pub fn spawn(
        registry: Arc<ConnectionRegistry>,
        directory: Arc<RoomDirectory>,
        capacity: usize,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity);
        let worker = RelayWorker {
            rx,
            registry,
            directory,
        };
        let handle = tokio::spawn(worker.run());
        (Self { tx }, handle)
    }

    /// Enqueue an envelope.
    pub async fn enqueue(&self, envelope: Envelope) -> Result<()> {
        self.tx
            .send(envelope)
            .await
            .map_err(|_| RoomcastError::RelayClosed)
    }

    /// Enqueue an event for a single connection.
    pub async fn unicast(&self, connection: ConnectionId, event: ServerEvent) -> Result<()> {
        self.enqueue(Envelope::unicast(connection, event)).await
    }

    /// Enqueue an event for every member of a room.
    pub async fn to_room(&self, room_name: impl Into<String>, event: ServerEvent) -> Result<()> {
        self.enqueue(Envelope::to_room(room_name, event)).await
    }

    /// Enqueue an event for every live connection.
    pub async fn broadcast(&self, event: ServerEvent) -> Result<()> {
        self.enqueue(Envelope::broadcast(event)).await
    }
}

/// Consumer side of the relay queue.
struct RelayWorker {
    rx: mpsc::Receiver<Envelope>,
    registry: Arc<ConnectionRegistry>,
    directory: Arc<RoomDirectory>,
}

impl RelayWorker {
    async fn run(mut self) {
        tracing::debug!("Relay started");
        while let Some(envelope) = self.rx.recv().await {
            self.deliver(envelope).await;
        }
        tracing::debug!("Relay stopped");
    }

    /// Deliver one envelope.
    async fn deliver(&self, envelope: Envelope) {
        let frame = match serde_json::to_string(&envelope.event) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(
                    event = envelope.event.event_type(),
                    error = %e,
                    "Failed to serialize outbound event"
                );
                return;
            }
        };

        match envelope.target {
            Target::Connection(id) => match self.registry.get(id).await {
                Some(connection) => self.write(&connection, frame).await,
                None => tracing::debug!(connection = %id, "Unicast target is gone"),
            },
            Target::Room(room_name) => {
                let room = match self.directory.get_room(&room_name).await {
                    Ok(room) => room,
                    Err(e) => {
                        tracing::debug!(room = %room_name, error = %e, "Multicast target is gone");
                        return;
                    }
                };

                for id in room.member_connections().await {
                    // Members whose connection dropped stay in the room
                    // but are unreachable until they reconnect.
                    if let Some(connection) = self.registry.get(id).await {
                        self.write(&connection, frame.clone()).await;
                    }
                }
            }
            Target::All => {
                for connection in self.registry.snapshot().await {
                    self.write(&connection, frame.clone()).await;
                }
            }
        }
    }

    /// Write a frame, dropping the connection from the registry on failure.
    async fn write(&self, connection: &Connection, frame: String) {
        if let Err(e) = connection.write(frame) {
            tracing::warn!(
                connection = %connection.id(),
                error = %e,
                "Write failed, dropping connection"
            );
            self.registry.unregister(connection.id()).await;
        }
    }
}
