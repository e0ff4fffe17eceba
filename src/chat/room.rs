//! Chat room implementation for roomcast.
//!
//! A room only tracks who its members are and which connection each one
//! is currently bound to. Delivery is the relay's job.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::connection::ConnectionId;
use super::error::ChatError;
use super::token::SessionToken;

/// A room member.
#[derive(Debug, Clone)]
pub struct Member {
    /// Display name, unique within the room.
    pub name: String,
    /// Session token issued on create/join.
    pub token: SessionToken,
    /// Connection the member is currently bound to.
    ///
    /// The connection may already be gone; the member stays until it
    /// leaves explicitly.
    pub connection: ConnectionId,
    /// Join timestamp.
    pub joined_at: DateTime<Utc>,
}

impl Member {
    /// Create a new member.
    pub fn new(name: impl Into<String>, token: SessionToken, connection: ConnectionId) -> Self {
        Self {
            name: name.into(),
            token,
            connection,
            joined_at: Utc::now(),
        }
    }
}

/// A named chat room.
pub struct Room {
    /// Room name.
    name: String,
    /// Creation timestamp.
    created_at: DateTime<Utc>,
    /// Members indexed by username.
    members: RwLock<HashMap<String, Member>>,
}

impl Room {
    /// Create a new, empty room.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: Utc::now(),
            members: RwLock::new(HashMap::new()),
        }
    }

    /// Create a room whose first member is `creator`.
    pub fn with_member(name: impl Into<String>, creator: Member) -> Self {
        let mut room = Self::new(name);
        room.members.get_mut().insert(creator.name.clone(), creator);
        room
    }

    /// Get the room name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Add a member.
    ///
    /// Fails with [`ChatError::UsernameTaken`] if a member with that name
    /// already exists.
    pub async fn add_user(&self, member: Member) -> Result<(), ChatError> {
        let mut members = self.members.write().await;
        if members.contains_key(&member.name) {
            return Err(ChatError::UsernameTaken {
                room: self.name.clone(),
                username: member.name,
            });
        }
        members.insert(member.name.clone(), member);
        Ok(())
    }

    /// Remove the member holding `token`.
    ///
    /// Returns the removed member, or None if no member holds the token.
    pub async fn remove_user(&self, token: &str) -> Option<Member> {
        let mut members = self.members.write().await;
        let name = members
            .values()
            .find(|m| m.token.as_str() == token)
            .map(|m| m.name.clone())?;
        members.remove(&name)
    }

    /// Find the member holding `token`.
    pub async fn user_by_token(&self, token: &str) -> Option<Member> {
        self.members
            .read()
            .await
            .values()
            .find(|m| m.token.as_str() == token)
            .cloned()
    }

    /// Bind the member holding `token` to a new connection.
    ///
    /// Returns the updated member, or None if no member holds the token.
    pub async fn rebind(&self, token: &str, connection: ConnectionId) -> Option<Member> {
        let mut members = self.members.write().await;
        let member = members.values_mut().find(|m| m.token.as_str() == token)?;
        member.connection = connection;
        Some(member.clone())
    }

    /// Connections of all current members.
    pub async fn member_connections(&self) -> Vec<ConnectionId> {
        self.members
            .read()
            .await
            .values()
            .map(|m| m.connection)
            .collect()
    }

    /// Sorted list of member names.
    pub async fn usernames(&self) -> Vec<String> {
        let mut names: Vec<String> = self.members.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a member with that name exists.
    pub async fn is_member(&self, username: &str) -> bool {
        self.members.read().await.contains_key(username)
    }

    /// Get the number of members.
    pub async fn member_count(&self) -> usize {
        self.members.read().await.len()
    }
}
