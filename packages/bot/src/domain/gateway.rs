//! Platform Gateway trait 定義
//!
//! ドメイン層が外部プラットフォームに要求する操作のインターフェース。
//! 具体的な実装（WebSocket ブリッジ等）は Infrastructure 層が提供します。

use async_trait::async_trait;

use super::{
    error::GatewayError,
    panel::ControlPanel,
    value_object::{ChannelId, GuildId, InteractionId, UserId, UserLimit},
};

/// Parameters of a voice channel to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVoiceChannel {
    pub name: String,
    pub category_id: ChannelId,
    pub bitrate: u32,
    pub user_limit: UserLimit,
}

/// Live platform-side view of a voice channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceChannelState {
    pub name: String,
    pub user_limit: UserLimit,
    pub members: Vec<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionTarget {
    /// The guild's default role (everyone).
    DefaultRole,
    User(UserId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Connect,
    ViewChannel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionValue {
    Allow,
    Deny,
    /// No explicit overwrite; the permission is inherited.
    Unset,
}

/// One per-principal permission overwrite on a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionOverwrite {
    pub target: PermissionTarget,
    pub permission: Permission,
    pub value: PermissionValue,
}

/// Platform Gateway trait
///
/// UseCase 層はこの trait に依存し、ブリッジの具体的な実装には依存しない。
#[async_trait]
pub trait PlatformGateway: Send + Sync {
    async fn create_voice_channel(
        &self,
        guild: &GuildId,
        channel: NewVoiceChannel,
    ) -> Result<ChannelId, GatewayError>;

    async fn delete_channel(&self, guild: &GuildId, channel: &ChannelId)
    -> Result<(), GatewayError>;

    /// `Ok(None)` when the channel no longer exists on the platform.
    async fn channel_state(
        &self,
        guild: &GuildId,
        channel: &ChannelId,
    ) -> Result<Option<VoiceChannelState>, GatewayError>;

    /// Voice channel the user is currently connected to, if any.
    async fn member_voice_channel(
        &self,
        guild: &GuildId,
        user: &UserId,
    ) -> Result<Option<ChannelId>, GatewayError>;

    async fn set_channel_name(
        &self,
        guild: &GuildId,
        channel: &ChannelId,
        name: &str,
    ) -> Result<(), GatewayError>;

    async fn set_user_limit(
        &self,
        guild: &GuildId,
        channel: &ChannelId,
        limit: UserLimit,
    ) -> Result<(), GatewayError>;

    async fn set_permission(
        &self,
        guild: &GuildId,
        channel: &ChannelId,
        overwrite: PermissionOverwrite,
    ) -> Result<(), GatewayError>;

    async fn move_member(
        &self,
        guild: &GuildId,
        user: &UserId,
        channel: &ChannelId,
    ) -> Result<(), GatewayError>;

    async fn disconnect_member(&self, guild: &GuildId, user: &UserId) -> Result<(), GatewayError>;

    async fn send_direct_message(&self, user: &UserId, content: &str) -> Result<(), GatewayError>;

    async fn send_message(&self, channel: &ChannelId, content: &str) -> Result<(), GatewayError>;

    async fn post_control_panel(
        &self,
        channel: &ChannelId,
        panel: &ControlPanel,
    ) -> Result<(), GatewayError>;

    /// Private answer to a control activation, visible to the actor only.
    async fn respond(&self, interaction: &InteractionId, content: &str)
    -> Result<(), GatewayError>;
}
