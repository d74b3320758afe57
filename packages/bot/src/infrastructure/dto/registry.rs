//! Persisted registry document.
//!
//! Layout: `{ "<guildId>": { "<channelId>": RoomRecord } }`. Field names match
//! the data files written by earlier TempVoice deployments.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type RegistryDocument = BTreeMap<String, BTreeMap<String, RoomRecord>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRecord {
    pub owner: String,
    #[serde(rename = "coowners", default)]
    pub co_owners: Vec<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub banned: Vec<String>,
    #[serde(default)]
    pub backup_name: String,
    #[serde(default)]
    pub user_limit: i64,
    #[serde(default)]
    pub trusted: Vec<String>,
}
