//! roomcast - real-time chat rooms over WebSocket
//!
//! Clients create and join named rooms, exchange messages, and resume
//! their membership after a dropped connection using a session token.

pub mod chat;
pub mod config;
pub mod error;
pub mod logging;
pub mod web;

pub use chat::{
    ChatError, ClientEvent, ConnectionId, ConnectionRegistry, Dispatcher, Relay, RoomDirectory,
    ServerEvent, SessionToken, SessionTokenStore,
};
pub use config::Config;
pub use error::{Result, RoomcastError};
pub use web::WebServer;
