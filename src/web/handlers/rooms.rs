//! Room listing handler.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{extract::State, Json};

use crate::chat::RoomInfo;

use super::AppState;

/// List every room and its members.
///
/// GET /rooms
///
/// The response is keyed by room name. Session tokens are never included.
pub async fn list_rooms(State(state): State<Arc<AppState>>) -> Json<BTreeMap<String, RoomInfo>> {
    let rooms = state
        .directory
        .list_rooms()
        .await
        .into_iter()
        .map(|info| (info.name.clone(), info))
        .collect();
    Json(rooms)
}
