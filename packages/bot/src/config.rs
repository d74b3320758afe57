//! Bot configuration loaded from a JSON file.
//!
//! Key names follow the long-standing config format (`creatorChannel`, `tempCategory`, ...).
//! Channel ids left empty disable the behavior that depends on them.

use std::{path::Path, time::Duration};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{ChannelId, UserId, UserLimit, ValueObjectError};

pub const DEFAULT_BITRATE: u32 = 64_000;
pub const DEFAULT_COOLDOWN_SECONDS: u64 = 8;
pub const DEFAULT_COLLECTOR_WINDOW_SECONDS: u64 = 30;
pub const DEFAULT_COMMAND_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("invalid value for {key}: {source}")]
    Invalid {
        key: &'static str,
        source: ValueObjectError,
    },
}

/// Validated runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    /// Joining this channel creates a room.
    pub lobby_channel: Option<ChannelId>,
    /// Category new rooms are created under.
    pub room_category: Option<ChannelId>,
    /// Operator log channel.
    pub log_channel: Option<ChannelId>,
    /// Text channel receiving control panels.
    pub panel_channel: Option<ChannelId>,
    pub default_bitrate: u32,
    pub default_user_limit: UserLimit,
    pub creation_cooldown: Duration,
    pub app_owner: Option<UserId>,
    pub collector_window: Duration,
    pub gateway_command_timeout: Duration,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            lobby_channel: None,
            room_category: None,
            log_channel: None,
            panel_channel: None,
            default_bitrate: DEFAULT_BITRATE,
            default_user_limit: UserLimit::UNLIMITED,
            creation_cooldown: Duration::from_secs(DEFAULT_COOLDOWN_SECONDS),
            app_owner: None,
            collector_window: Duration::from_secs(DEFAULT_COLLECTOR_WINDOW_SECONDS),
            gateway_command_timeout: Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECONDS),
        }
    }
}

/// On-disk layout of the config file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    #[serde(default)]
    creator_channel: Option<String>,
    #[serde(default)]
    temp_category: Option<String>,
    #[serde(default)]
    log_channel: Option<String>,
    #[serde(default)]
    setup_channel: Option<String>,
    #[serde(default)]
    default_bitrate: Option<u32>,
    #[serde(default)]
    default_user_limit: Option<i64>,
    #[serde(default)]
    cooldown_create_seconds: Option<u64>,
    #[serde(default)]
    owner_id: Option<String>,
    #[serde(default)]
    collector_window_seconds: Option<u64>,
    #[serde(default)]
    gateway_command_timeout_seconds: Option<u64>,
}

fn optional_id<T>(key: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: TryFrom<String, Error = ValueObjectError>,
{
    value
        .filter(|v| !v.trim().is_empty())
        .map(T::try_from)
        .transpose()
        .map_err(|source| ConfigError::Invalid { key, source })
}

impl TryFrom<ConfigFile> for BotConfig {
    type Error = ConfigError;

    fn try_from(file: ConfigFile) -> Result<Self, Self::Error> {
        let defaults = BotConfig::default();
        Ok(Self {
            lobby_channel: optional_id("creatorChannel", file.creator_channel)?,
            room_category: optional_id("tempCategory", file.temp_category)?,
            log_channel: optional_id("logChannel", file.log_channel)?,
            panel_channel: optional_id("setupChannel", file.setup_channel)?,
            default_bitrate: file.default_bitrate.unwrap_or(defaults.default_bitrate),
            default_user_limit: file
                .default_user_limit
                .map(UserLimit::clamped)
                .unwrap_or(defaults.default_user_limit),
            creation_cooldown: file
                .cooldown_create_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.creation_cooldown),
            app_owner: optional_id("ownerId", file.owner_id)?,
            collector_window: file
                .collector_window_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.collector_window),
            gateway_command_timeout: file
                .gateway_command_timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.gateway_command_timeout),
        })
    }
}

impl BotConfig {
    pub fn from_json(path: &str, json: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })?;
        Self::try_from(file)
    }

    /// Read and validate the config file. A missing file is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        Self::from_json(&display, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_legacy_config_keys_are_read() {
        // テスト項目: 従来のキー名で書かれた設定ファイルを読み込める
        // given (前提条件):
        let json = r#"{
            "creatorChannel": "1001",
            "tempCategory": "1002",
            "logChannel": "1003",
            "setupChannel": "1004",
            "defaultBitrate": 96000,
            "defaultUserLimit": 5,
            "cooldownCreateSeconds": 12,
            "ownerId": "42"
        }"#;

        // when (操作):
        let config = BotConfig::from_json("config.json", json).unwrap();

        // then (期待する結果):
        assert_eq!(config.lobby_channel, Some(ChannelId::new("1001").unwrap()));
        assert_eq!(config.room_category, Some(ChannelId::new("1002").unwrap()));
        assert_eq!(config.log_channel, Some(ChannelId::new("1003").unwrap()));
        assert_eq!(config.panel_channel, Some(ChannelId::new("1004").unwrap()));
        assert_eq!(config.default_bitrate, 96_000);
        assert_eq!(config.default_user_limit, UserLimit::clamped(5));
        assert_eq!(config.creation_cooldown, Duration::from_secs(12));
        assert_eq!(config.app_owner, Some(UserId::new("42").unwrap()));
    }

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        // テスト項目: 未指定の項目は既定値、空のチャンネル ID は未設定として扱う
        // given (前提条件):
        let json = r#"{ "creatorChannel": "", "defaultUserLimit": 500 }"#;

        // when (操作):
        let config = BotConfig::from_json("config.json", json).unwrap();

        // then (期待する結果):
        assert_eq!(config.lobby_channel, None);
        assert_eq!(config.default_bitrate, DEFAULT_BITRATE);
        assert_eq!(config.default_user_limit.value(), UserLimit::MAX);
        assert_eq!(config.creation_cooldown, Duration::from_secs(8));
        assert_eq!(config.collector_window, Duration::from_secs(30));
        assert_eq!(config.gateway_command_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        // テスト項目: 設定ファイルが存在しない場合はエラー
        let dir = tempfile::tempdir().unwrap();
        let result = BotConfig::load(dir.path().join("config.json"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        // テスト項目: JSON として不正な設定ファイルはエラー
        // given (前提条件):
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        // when (操作):
        let result = BotConfig::load(file.path());

        // then (期待する結果):
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
