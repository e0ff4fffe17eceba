//! Wire events exchanged over the chat socket.
//!
//! Every frame, in both directions, is a JSON object of the form
//! `{ "eventType": "...", "data": { ... } }`.

use serde::{Deserialize, Serialize};

use super::error::ChatError;
use super::token::SessionToken;

/// Events sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "eventType", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Create a room and join it.
    CreateRoom(RoomRequest),
    /// Join an existing room.
    JoinRoom(RoomRequest),
    /// Leave a room.
    LeaveRoom(LeaveRequest),
    /// Resume membership on a new connection.
    ReconnectRoom(ReconnectRequest),
    /// Send a message to a room.
    SendMessage(SendMessageRequest),
}

impl ClientEvent {
    /// Wire name of the event.
    pub fn event_type(&self) -> &'static str {
        match self {
            ClientEvent::CreateRoom(_) => "create_room",
            ClientEvent::JoinRoom(_) => "join_room",
            ClientEvent::LeaveRoom(_) => "leave_room",
            ClientEvent::ReconnectRoom(_) => "reconnect_room",
            ClientEvent::SendMessage(_) => "send_message",
        }
    }
}

/// Payload of `create_room` and `join_room`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRequest {
    pub room_name: Option<String>,
    pub username: Option<String>,
}

/// Payload of `leave_room`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub room_name: Option<String>,
    pub username: Option<String>,
    pub token: Option<String>,
}

/// Payload of `reconnect_room`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReconnectRequest {
    pub token: Option<String>,
}

/// Payload of `send_message`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub room_name: Option<String>,
    pub username: Option<String>,
    pub body: Option<String>,
}

/// Extract a required field, rejecting absent and empty values.
pub fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, ChatError> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ChatError::MissingField(field)),
    }
}

/// Events sent from server to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "eventType",
    content = "data",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    /// A room was created by this client.
    RoomCreated {
        token: SessionToken,
        room_name: String,
    },
    /// This client joined a room.
    RoomJoined {
        token: SessionToken,
        room_name: String,
    },
    /// This client left a room.
    RoomLeft { token: String, room_name: String },
    /// This client resumed a membership.
    RoomReconnected {
        token: SessionToken,
        room_name: String,
        username: String,
    },
    /// The presented token does not resolve to a member.
    InvalidToken { token: String },
    /// A message was posted to a room this client is in.
    MessageReceived { username: String, body: String },
    /// A request failed.
    Error { code: String, message: String },
}

impl ServerEvent {
    /// Wire name of the event.
    pub fn event_type(&self) -> &'static str {
        match self {
            ServerEvent::RoomCreated { .. } => "room_created",
            ServerEvent::RoomJoined { .. } => "room_joined",
            ServerEvent::RoomLeft { .. } => "room_left",
            ServerEvent::RoomReconnected { .. } => "room_reconnected",
            ServerEvent::InvalidToken { .. } => "invalid_token",
            ServerEvent::MessageReceived { .. } => "message_received",
            ServerEvent::Error { .. } => "error",
        }
    }
}

impl From<&ChatError> for ServerEvent {
    fn from(err: &ChatError) -> Self {
        ServerEvent::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}
