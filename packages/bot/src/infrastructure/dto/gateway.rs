//! Gateway bridge wire format (JSON text frames over WebSocket).
//!
//! Bridge → bot: platform events and command results, tagged by `type`.
//! Bot → bridge: commands, correlated with their results by `request_id`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ControlPanel;

// ========================================
// Bridge → Bot
// ========================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundFrame {
    PresenceUpdate(PresenceUpdateDto),
    ButtonPressed(ButtonPressedDto),
    MessageCreated(MessageCreatedDto),
    CommandResult(CommandResultDto),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PresenceUpdateDto {
    pub guild_id: String,
    pub user_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub old_channel_id: Option<String>,
    #[serde(default)]
    pub new_channel_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ButtonPressedDto {
    pub interaction_id: String,
    #[serde(default)]
    pub guild_id: Option<String>,
    pub channel_id: String,
    pub custom_id: String,
    pub user_id: String,
    #[serde(default)]
    pub user_tag: String,
    #[serde(default)]
    pub can_manage_channels: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionDto {
    pub user_id: String,
    #[serde(default)]
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageCreatedDto {
    #[serde(default)]
    pub guild_id: Option<String>,
    pub channel_id: String,
    pub author_id: String,
    #[serde(default)]
    pub author_is_bot: bool,
    pub content: String,
    #[serde(default)]
    pub mentions: Vec<MentionDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelStateDto {
    pub name: String,
    #[serde(default)]
    pub user_limit: i64,
    #[serde(default)]
    pub members: Vec<String>,
}

/// Outcome of one command. Payload fields are set depending on the command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResultDto {
    pub request_id: Uuid,
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    /// Created channel, or the member's current voice channel.
    #[serde(default)]
    pub channel_id: Option<String>,
    /// Channel state query; `null` when the channel does not exist.
    #[serde(default)]
    pub channel: Option<ChannelStateDto>,
}

// ========================================
// Bot → Bridge
// ========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundFrame {
    Command {
        request_id: Uuid,
        command: CommandDto,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionDto {
    Connect,
    ViewChannel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionValueDto {
    Allow,
    Deny,
    Unset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PermissionTargetDto {
    DefaultRole,
    User { user_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandDto {
    CreateVoiceChannel {
        guild_id: String,
        category_id: String,
        name: String,
        bitrate: u32,
        user_limit: u8,
    },
    DeleteChannel {
        guild_id: String,
        channel_id: String,
    },
    GetChannelState {
        guild_id: String,
        channel_id: String,
    },
    GetMemberVoiceChannel {
        guild_id: String,
        user_id: String,
    },
    SetChannelName {
        guild_id: String,
        channel_id: String,
        name: String,
    },
    SetUserLimit {
        guild_id: String,
        channel_id: String,
        user_limit: u8,
    },
    SetPermission {
        guild_id: String,
        channel_id: String,
        target: PermissionTargetDto,
        permission: PermissionDto,
        value: PermissionValueDto,
    },
    MoveMember {
        guild_id: String,
        user_id: String,
        channel_id: String,
    },
    DisconnectMember {
        guild_id: String,
        user_id: String,
    },
    SendDirectMessage {
        user_id: String,
        content: String,
    },
    SendMessage {
        channel_id: String,
        content: String,
    },
    PostControlPanel {
        channel_id: String,
        panel: ControlPanel,
    },
    Respond {
        interaction_id: String,
        content: String,
    },
}
