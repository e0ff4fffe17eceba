//! Room directory for roomcast.
//!
//! This module provides centralized management of chat rooms, shared by
//! every connection task.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use super::error::ChatError;
use super::room::{Member, Room};

/// Directory of all rooms, keyed by name.
///
/// Rooms are never removed once created, so a room name handed out in a
/// session token always resolves.
pub struct RoomDirectory {
    /// Rooms indexed by name.
    rooms: RwLock<HashMap<String, Arc<Room>>>,
}

impl RoomDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Create a new, empty room.
    ///
    /// Fails with [`ChatError::RoomAlreadyExists`] if the name is taken.
    pub async fn create_room(&self, name: impl Into<String>) -> Result<Arc<Room>, ChatError> {
        self.publish(Room::new(name)).await
    }

    /// Create a room that already contains `creator`.
    ///
    /// The room becomes visible with its creator in place, so no other
    /// join can take the creator's name first.
    pub async fn create_room_with_member(
        &self,
        name: impl Into<String>,
        creator: Member,
    ) -> Result<Arc<Room>, ChatError> {
        self.publish(Room::with_member(name, creator)).await
    }

    async fn publish(&self, room: Room) -> Result<Arc<Room>, ChatError> {
        let mut rooms = self.rooms.write().await;

        if rooms.contains_key(room.name()) {
            return Err(ChatError::RoomAlreadyExists(room.name().to_string()));
        }

        let room = Arc::new(room);
        rooms.insert(room.name().to_string(), Arc::clone(&room));
        Ok(room)
    }

    /// Get a room by name.
    pub async fn get_room(&self, name: &str) -> Result<Arc<Room>, ChatError> {
        self.rooms
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| ChatError::RoomNotFound(name.to_string()))
    }

    /// List all rooms, sorted by name.
    pub async fn list_rooms(&self) -> Vec<RoomInfo> {
        let rooms: Vec<Arc<Room>> = self.rooms.read().await.values().cloned().collect();

        let mut result = Vec::with_capacity(rooms.len());
        for room in rooms {
            result.push(RoomInfo {
                name: room.name().to_string(),
                users: room.usernames().await,
                created_at: room.created_at(),
            });
        }

        result.sort_by(|a, b| a.name.cmp(&b.name));
        result
    }

    /// Get the number of rooms.
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

impl Default for RoomDirectory {
    fn default() -> Self {
        Self::new()
    }
}

/// Public view of a room.
///
/// Session tokens and connection bindings are deliberately absent.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfo {
    /// Room name.
    pub name: String,
    /// Member names, sorted.
    pub users: Vec<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
