//! Chat module for roomcast.
//!
//! This module provides the shared chat state and the protocol engine:
//! - Connection registry for every live socket
//! - Session tokens for resuming membership after a reconnect
//! - Room directory and per-room membership
//! - Event dispatcher (create/join/leave/reconnect/send)
//! - Message relay that performs all outbound writes in order

mod connection;
mod directory;
mod dispatcher;
mod error;
mod event;
mod relay;
mod room;
mod token;

pub use connection::{Connection, ConnectionId, ConnectionRegistry, WriteError};
pub use directory::{RoomDirectory, RoomInfo};
pub use dispatcher::Dispatcher;
pub use error::ChatError;
pub use event::{
    ClientEvent, LeaveRequest, ReconnectRequest, RoomRequest, SendMessageRequest, ServerEvent,
};
pub use relay::{Envelope, Relay, Target};
pub use room::{Member, Room};
pub use token::{SessionToken, SessionTokenStore, TokenEntry, TOKEN_LENGTH};
