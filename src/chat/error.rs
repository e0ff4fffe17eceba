//! Protocol-level chat errors.

use thiserror::Error;

/// Errors reported back to the client that caused them.
///
/// None of these are fatal to the connection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// A room with that name already exists.
    #[error("Room name is taken: {0}")]
    RoomAlreadyExists(String),

    /// No room with that name exists.
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    /// The room already has a member with that name.
    #[error("User with that name already exists in room {room}: {username}")]
    UsernameTaken {
        /// Room name.
        room: String,
        /// Requested username.
        username: String,
    },

    /// A required field was missing or empty.
    #[error("missing {0}")]
    MissingField(&'static str),

    /// The frame could not be decoded into a known event.
    #[error("invalid event: {0}")]
    InvalidEvent(String),
}

impl ChatError {
    /// Stable error code sent in the `error` event.
    pub fn code(&self) -> &'static str {
        match self {
            ChatError::RoomAlreadyExists(_) => "RoomAlreadyExists",
            ChatError::RoomNotFound(_) => "RoomNotFound",
            ChatError::UsernameTaken { .. } => "UsernameTaken",
            ChatError::MissingField(_) => "MissingField",
            ChatError::InvalidEvent(_) => "InvalidEvent",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(
            ChatError::RoomAlreadyExists("a".into()).code(),
            "RoomAlreadyExists"
        );
        assert_eq!(ChatError::RoomNotFound("a".into()).code(), "RoomNotFound");
        assert_eq!(
            ChatError::UsernameTaken {
                room: "a".into(),
                username: "b".into()
            }
            .code(),
            "UsernameTaken"
        );
        assert_eq!(ChatError::MissingField("roomName").code(), "MissingField");
        assert_eq!(ChatError::InvalidEvent("x".into()).code(), "InvalidEvent");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ChatError::MissingField("username").to_string(),
            "missing username"
        );
        assert_eq!(
            ChatError::RoomNotFound("missing-room".into()).to_string(),
            "Room not found: missing-room"
        );
    }
}
