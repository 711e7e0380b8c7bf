//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;

use crate::ui::state::AppState;
use atelier_shared::time::timestamp_to_rfc3339;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

#[derive(Debug, Serialize)]
pub struct ConnectionDto {
    pub connection_id: String,
    pub user_id: Option<String>,
    pub display_name: Option<String>,
    pub connected_at: String,
}

#[derive(Debug, Serialize)]
pub struct RoomCountDto {
    pub room: String,
    pub members: usize,
}

#[derive(Debug, Serialize)]
pub struct PresenceDto {
    pub connections: Vec<ConnectionDto>,
    pub connection_count: usize,
    pub online_users: Vec<String>,
    pub rooms: Vec<RoomCountDto>,
}

/// Debug endpoint: current connections, online users, and room sizes.
pub async fn debug_presence(State(state): State<Arc<AppState>>) -> Json<PresenceDto> {
    let connections = state
        .registry
        .snapshot()
        .await
        .into_iter()
        .map(|(id, identity, connected_at)| ConnectionDto {
            connection_id: id.to_string(),
            user_id: identity.as_ref().map(|i| i.user_id.to_string()),
            display_name: identity.map(|i| i.display_name),
            connected_at: timestamp_to_rfc3339(connected_at),
        })
        .collect();

    let online_users = state
        .registry
        .online_identities()
        .await
        .into_iter()
        .map(|identity| identity.user_id.to_string())
        .collect();

    let rooms = state
        .rooms
        .room_counts()
        .await
        .into_iter()
        .map(|(room, members)| RoomCountDto {
            room: room.to_string(),
            members,
        })
        .collect();

    Json(PresenceDto {
        connection_count: state.registry.count().await,
        connections,
        online_users,
        rooms,
    })
}
