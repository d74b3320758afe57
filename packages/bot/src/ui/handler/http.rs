//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::GuildId,
    infrastructure::dto::http::{HealthDto, RoomSummaryDto},
    ui::state::AppState,
};
use tempvoice_shared::time::timestamp_to_rfc3339;

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
        gateway_connected: state.gateway.is_connected().await,
        active_rooms: state.list_rooms_usecase.count().await,
    })
}

/// Active rooms of one guild
pub async fn get_guild_rooms(
    State(state): State<Arc<AppState>>,
    Path(guild_id): Path<String>,
) -> Result<Json<Vec<RoomSummaryDto>>, StatusCode> {
    let guild = GuildId::new(guild_id).map_err(|_| StatusCode::BAD_REQUEST)?;
    let rooms = state.list_rooms_usecase.execute(&guild).await;

    // Domain Model から DTO への変換
    let summaries = rooms
        .into_iter()
        .map(|(channel, room)| RoomSummaryDto {
            channel_id: channel.into_string(),
            name: room.backup_name,
            owner: room.owner.into_string(),
            co_owners: room.co_owners.into_iter().map(String::from).collect(),
            user_limit: room.user_limit.value(),
            private: room.private,
            hidden: room.hidden,
            banned: room.banned.len(),
            created_at: timestamp_to_rfc3339(room.created_at.value()),
        })
        .collect();

    Ok(Json(summaries))
}
