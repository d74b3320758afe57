//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
    pub gateway_connected: bool,
    pub active_rooms: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub channel_id: String,
    pub name: String,
    pub owner: String,
    pub co_owners: Vec<String>,
    pub user_limit: u8,
    pub private: bool,
    pub hidden: bool,
    pub banned: usize,
    /// RFC 3339
    pub created_at: String,
}
