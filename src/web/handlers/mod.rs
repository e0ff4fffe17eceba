//! HTTP handlers and shared state.

pub mod rooms;
pub mod state;

pub use rooms::*;
pub use state::AppState;
