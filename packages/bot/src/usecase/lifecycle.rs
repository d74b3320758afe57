//! UseCase: Lifecycle Controller
//!
//! ## 責務
//!
//! - ロビー参加時のルーム作成（クールダウン付き）
//! - 退出で空になったルームの破棄
//! - オーナーが自分のルームに入ったときのコントロールパネル再投稿
//! - プラットフォーム上から消えたチャンネルのレジストリ整合（orphan の回収）
//!
//! ## 設計ノート
//!
//! イベントをまたいでメンバー数やルーム状態をキャッシュしない。毎回レジストリと
//! プラットフォームから現在の状態を読み直す。

use std::sync::{Arc, Mutex};

use tempvoice_shared::time::Clock;

use crate::{
    config::BotConfig,
    domain::{
        ChannelId, ControlPanel, CooldownLedger, GuildId, NewVoiceChannel, PlatformGateway,
        PresenceUpdate, Room, RoomRepository, Timestamp, UserId,
    },
};

use super::{error::CreateRoomError, operator_log::OperatorLog};

/// What a presence transition caused.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LifecycleReport {
    pub created: Option<ChannelId>,
    pub destroyed: Option<ChannelId>,
    /// Registered channel found missing on the platform and dropped.
    pub reconciled: Option<ChannelId>,
    pub panel_reposted: bool,
}

/// ルームのライフサイクル管理のユースケース
pub struct ManageLifecycleUseCase {
    repository: Arc<dyn RoomRepository>,
    gateway: Arc<dyn PlatformGateway>,
    operator_log: OperatorLog,
    config: Arc<BotConfig>,
    clock: Arc<dyn Clock>,
    cooldowns: Mutex<CooldownLedger>,
}

impl ManageLifecycleUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        gateway: Arc<dyn PlatformGateway>,
        operator_log: OperatorLog,
        config: Arc<BotConfig>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let interval = i64::try_from(config.creation_cooldown.as_millis()).unwrap_or(i64::MAX);
        Self {
            repository,
            gateway,
            operator_log,
            config,
            clock,
            cooldowns: Mutex::new(CooldownLedger::new(interval)),
        }
    }

    /// Handle one presence transition.
    ///
    /// Failures are logged per step; a failing step never prevents the others.
    pub async fn execute(&self, event: PresenceUpdate) -> LifecycleReport {
        let mut report = LifecycleReport::default();

        if let Some(new_channel) = &event.new_channel
            && self.config.lobby_channel.as_ref() == Some(new_channel)
        {
            match self
                .create_room(&event.guild_id, &event.user_id, &event.username)
                .await
            {
                Ok(channel) => report.created = Some(channel),
                Err(CreateRoomError::Abandoned(channel)) => {
                    tracing::info!("Room {} was empty once registered, destroyed", channel);
                    report.destroyed = Some(channel);
                }
                Err(CreateRoomError::CoolingDown(user)) => {
                    tracing::debug!("Room creation for {} skipped: cooling down", user)
                }
                Err(e) => tracing::warn!("Room creation for {} failed: {}", event.user_id, e),
            }
        }

        if let Some(old_channel) = &event.old_channel
            && event.new_channel.as_ref() != Some(old_channel)
        {
            self.destroy_if_empty(&event.guild_id, old_channel, &mut report)
                .await;
        }

        if let Some(new_channel) = &event.new_channel {
            report.panel_reposted = self
                .repost_panel_for_owner(&event.guild_id, new_channel, &event.user_id)
                .await;
        }

        report
    }

    /// Allocate a room for `user` and move them into it.
    ///
    /// The cooldown slot is consumed before anything else. No registry entry is
    /// written unless the channel was created. A room that is already empty once
    /// registered (failed move, or the member left in between) is destroyed and
    /// reported as [`CreateRoomError::Abandoned`].
    pub async fn create_room(
        &self,
        guild: &GuildId,
        user: &UserId,
        username: &str,
    ) -> Result<ChannelId, CreateRoomError> {
        let now = Timestamp::new(self.clock.now_millis());
        let accepted = {
            let mut cooldowns = self.cooldowns.lock().unwrap_or_else(|e| e.into_inner());
            cooldowns.try_acquire(user, now)
        };
        if !accepted {
            return Err(CreateRoomError::CoolingDown(user.to_string()));
        }

        let category = self
            .config
            .room_category
            .clone()
            .ok_or(CreateRoomError::NotConfigured)?;

        let display = if username.trim().is_empty() {
            user.as_str()
        } else {
            username
        };
        let name = format!("{display}'s Room");

        let channel = self
            .gateway
            .create_voice_channel(
                guild,
                NewVoiceChannel {
                    name: name.clone(),
                    category_id: category,
                    bitrate: self.config.default_bitrate,
                    user_limit: self.config.default_user_limit,
                },
            )
            .await?;

        if let Err(e) = self.gateway.move_member(guild, user, &channel).await {
            tracing::warn!("Failed to move {} into {}: {}", user, channel, e);
        }

        let room = Room::new(user.clone(), name.clone(), self.config.default_user_limit, now);
        self.repository
            .insert_room(guild.clone(), channel.clone(), room.clone())
            .await?;

        // no later leave event names this channel if nobody ever got in
        let mut check = LifecycleReport::default();
        self.destroy_if_empty(guild, &channel, &mut check).await;
        if check.destroyed.is_some() || check.reconciled.is_some() {
            return Err(CreateRoomError::Abandoned(channel));
        }
        tracing::info!("Room {} created for {} in guild {}", channel, user, guild);

        self.operator_log
            .notify(format!("🎧 [Create] {} -> {}", user.mention(), name));
        self.post_panel(&channel, &name, &room).await;

        Ok(channel)
    }

    async fn destroy_if_empty(
        &self,
        guild: &GuildId,
        channel: &ChannelId,
        report: &mut LifecycleReport,
    ) {
        if self.repository.get_room(guild, channel).await.is_none() {
            return;
        }

        let state = match self.gateway.channel_state(guild, channel).await {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!("Cannot inspect room {}: {}", channel, e);
                return;
            }
        };

        match state {
            None => {
                if self.forget(guild, channel).await {
                    tracing::info!("Room {} vanished from the platform, entry dropped", channel);
                    report.reconciled = Some(channel.clone());
                }
            }
            Some(state) if state.members.is_empty() => {
                // another event may already have removed it
                if !self.forget(guild, channel).await {
                    return;
                }
                if let Err(e) = self.gateway.delete_channel(guild, channel).await {
                    tracing::warn!("Failed to delete empty room {}: {}", channel, e);
                }
                tracing::info!("Empty room {} destroyed", channel);
                self.operator_log
                    .notify(format!("🗑️ [Delete] Empty temp {}", state.name));
                report.destroyed = Some(channel.clone());
            }
            Some(_) => {}
        }
    }

    async fn repost_panel_for_owner(
        &self,
        guild: &GuildId,
        channel: &ChannelId,
        user: &UserId,
    ) -> bool {
        let Some(room) = self.repository.get_room(guild, channel).await else {
            return false;
        };
        if room.owner != *user || self.config.panel_channel.is_none() {
            return false;
        }
        let name = match self.gateway.channel_state(guild, channel).await {
            Ok(Some(state)) => state.name,
            _ => room.backup_name.clone(),
        };
        self.post_panel(channel, &name, &room).await
    }

    /// Remove the entry. Returns `true` if this call removed it.
    async fn forget(&self, guild: &GuildId, channel: &ChannelId) -> bool {
        match self.repository.remove_room(guild, channel).await {
            Ok(removed) => removed.is_some(),
            Err(e) => {
                // the in-memory entry is gone even though the write failed
                tracing::error!("Failed to persist removal of {}: {}", channel, e);
                true
            }
        }
    }

    async fn post_panel(&self, channel: &ChannelId, name: &str, room: &Room) -> bool {
        let Some(panel_channel) = &self.config.panel_channel else {
            return false;
        };
        let panel = ControlPanel::build(channel, name, room);
        match self.gateway.post_control_panel(panel_channel, &panel).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to post control panel for {}: {}", channel, e);
                false
            }
        }
    }
}
