//! Web module for roomcast.
//!
//! This module provides the WebSocket chat endpoint and a read-only HTTP
//! view of the room directory.

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;
pub mod ws;

pub use handlers::AppState;
pub use router::{create_health_router, create_router};
pub use server::WebServer;
