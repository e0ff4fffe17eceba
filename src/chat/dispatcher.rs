//! Event dispatcher.
//!
//! Turns inbound frames into directory and token store operations and
//! hands the resulting outbound events to the relay.

use std::sync::Arc;

use super::connection::ConnectionId;
use super::directory::RoomDirectory;
use super::error::ChatError;
use super::event::{
    required, ClientEvent, LeaveRequest, ReconnectRequest, RoomRequest, SendMessageRequest,
    ServerEvent,
};
use super::relay::{Envelope, Relay};
use super::room::{Member, Room};
use super::token::{SessionToken, SessionTokenStore};
use crate::Result;

/// Protocol state machine shared by every connection task.
#[derive(Clone)]
pub struct Dispatcher {
    directory: Arc<RoomDirectory>,
    tokens: Arc<SessionTokenStore>,
    relay: Relay,
}

impl Dispatcher {
    /// Create a new dispatcher.
    pub fn new(
        directory: Arc<RoomDirectory>,
        tokens: Arc<SessionTokenStore>,
        relay: Relay,
    ) -> Self {
        Self {
            directory,
            tokens,
            relay,
        }
    }

    /// Decode and handle one text frame from `connection`.
    ///
    /// Undecodable frames are answered with an `InvalidEvent` error; the
    /// connection stays usable. The only error returned is a closed relay.
    pub async fn handle_frame(&self, connection: ConnectionId, frame: &str) -> Result<()> {
        match serde_json::from_str::<ClientEvent>(frame) {
            Ok(event) => self.dispatch(connection, event).await,
            Err(e) => self.reject_frame(connection, &e.to_string()).await,
        }
    }

    /// Answer a frame that could not be decoded with an `InvalidEvent` error.
    pub async fn reject_frame(&self, connection: ConnectionId, reason: &str) -> Result<()> {
        tracing::debug!(connection = %connection, reason, "Undecodable frame");
        let err = ChatError::InvalidEvent(reason.to_string());
        self.relay
            .unicast(connection, ServerEvent::from(&err))
            .await
    }

    /// Handle a decoded event from `connection`.
    pub async fn dispatch(&self, connection: ConnectionId, event: ClientEvent) -> Result<()> {
        let event_type = event.event_type();
        let result = match event {
            ClientEvent::CreateRoom(req) => self.create_room(connection, req).await,
            ClientEvent::JoinRoom(req) => self.join_room(connection, req).await,
            ClientEvent::LeaveRoom(req) => self.leave_room(connection, req).await,
            ClientEvent::ReconnectRoom(req) => self.reconnect_room(connection, req).await,
            ClientEvent::SendMessage(req) => self.send_message(req).await,
        };

        let envelopes = match result {
            Ok(envelopes) => envelopes,
            Err(err) => {
                tracing::debug!(
                    connection = %connection,
                    event = event_type,
                    code = err.code(),
                    "{}",
                    err
                );
                vec![Envelope::unicast(connection, ServerEvent::from(&err))]
            }
        };

        for envelope in envelopes {
            self.relay.enqueue(envelope).await?;
        }
        Ok(())
    }

    async fn create_room(
        &self,
        connection: ConnectionId,
        req: RoomRequest,
    ) -> std::result::Result<Vec<Envelope>, ChatError> {
        let room_name = required(&req.room_name, "roomName")?;
        let username = required(&req.username, "username")?;

        let token = self.tokens.generate();
        let creator = Member::new(username, token.clone(), connection);
        let room = self.directory.create_room_with_member(room_name, creator).await?;
        self.tokens.put(token.clone(), username, room.name()).await;
        tracing::info!(room = %room_name, user = %username, "Room created");

        Ok(vec![
            Envelope::unicast(
                connection,
                ServerEvent::RoomCreated {
                    token: token.clone(),
                    room_name: room_name.to_string(),
                },
            ),
            Envelope::unicast(
                connection,
                ServerEvent::RoomJoined {
                    token,
                    room_name: room_name.to_string(),
                },
            ),
        ])
    }

    async fn join_room(
        &self,
        connection: ConnectionId,
        req: RoomRequest,
    ) -> std::result::Result<Vec<Envelope>, ChatError> {
        let room_name = required(&req.room_name, "roomName")?;
        let username = required(&req.username, "username")?;

        let room = self.directory.get_room(room_name).await?;
        let token = self.admit(&room, username, connection).await?;
        tracing::info!(room = %room_name, user = %username, "User joined");

        Ok(vec![Envelope::unicast(
            connection,
            ServerEvent::RoomJoined {
                token,
                room_name: room_name.to_string(),
            },
        )])
    }

    async fn leave_room(
        &self,
        connection: ConnectionId,
        req: LeaveRequest,
    ) -> std::result::Result<Vec<Envelope>, ChatError> {
        let room_name = required(&req.room_name, "roomName")?;
        let username = required(&req.username, "username")?;
        let token = required(&req.token, "token")?;

        let room = self.directory.get_room(room_name).await?;
        match room.remove_user(token).await {
            Some(member) => {
                self.tokens.revoke(token).await;
                tracing::info!(room = %room_name, user = %member.name, "User left");
            }
            None => {
                tracing::debug!(room = %room_name, user = %username, "Leave with unknown token");
            }
        }

        Ok(vec![Envelope::unicast(
            connection,
            ServerEvent::RoomLeft {
                token: token.to_string(),
                room_name: room_name.to_string(),
            },
        )])
    }

    async fn reconnect_room(
        &self,
        connection: ConnectionId,
        req: ReconnectRequest,
    ) -> std::result::Result<Vec<Envelope>, ChatError> {
        let token = required(&req.token, "token")?;
        let invalid = || {
            vec![Envelope::unicast(
                connection,
                ServerEvent::InvalidToken {
                    token: token.to_string(),
                },
            )]
        };

        let Some(entry) = self.tokens.get(token).await else {
            tracing::debug!(connection = %connection, "Reconnect with unknown token");
            return Ok(invalid());
        };
        let Ok(room) = self.directory.get_room(&entry.room_name).await else {
            tracing::warn!(room = %entry.room_name, "Token refers to a missing room");
            return Ok(invalid());
        };
        let Some(member) = room.rebind(token, connection).await else {
            tracing::debug!(room = %entry.room_name, "Token holder is no longer a member");
            return Ok(invalid());
        };

        tracing::info!(room = %room.name(), user = %member.name, "User reconnected");
        Ok(vec![Envelope::unicast(
            connection,
            ServerEvent::RoomReconnected {
                token: member.token,
                room_name: room.name().to_string(),
                username: member.name,
            },
        )])
    }

    async fn send_message(
        &self,
        req: SendMessageRequest,
    ) -> std::result::Result<Vec<Envelope>, ChatError> {
        let room_name = required(&req.room_name, "roomName")?;
        let username = required(&req.username, "username")?;
        let body = required(&req.body, "body")?;

        let room = self.directory.get_room(room_name).await?;
        Ok(vec![Envelope::to_room(
            room.name(),
            ServerEvent::MessageReceived {
                username: username.to_string(),
                body: body.to_string(),
            },
        )])
    }

    /// Add `username` to `room` bound to `connection` and issue its token.
    async fn admit(
        &self,
        room: &Room,
        username: &str,
        connection: ConnectionId,
    ) -> std::result::Result<SessionToken, ChatError> {
        let token = self.tokens.generate();
        room.add_user(Member::new(username, token.clone(), connection))
            .await?;
        self.tokens.put(token.clone(), username, room.name()).await;
        Ok(token)
    }
}
