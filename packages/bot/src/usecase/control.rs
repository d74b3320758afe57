//! UseCase: Access-Control Engine
//!
//! ## 責務
//!
//! - 1 件のコントロール操作を 1 つのルームに適用する
//! - 認可 → レジストリ更新（永続化込み）→ プラットフォームへのコマンド → ログ通知 の順で処理
//!
//! ## 設計ノート
//!
//! - レジストリ更新は `RoomRepository::update_room` による単一ステップで行い、
//!   現在の状態はクロージャ内で読み直す（待機をまたいだ古いスナップショットを使わない）
//! - プラットフォームへのコマンドはベストエフォート。失敗はログに残し、操作自体は成功として応答する
//! - 追加入力が必要な操作は、案内を応答した後に InputCollector で待機する

use std::sync::Arc;

use crate::domain::{
    Actor, ChannelId, ControlAction, GatewayError, GuildId, InputKind, InteractionId, Mention,
    Permission, PermissionOverwrite, PermissionTarget, PermissionValue, PlatformGateway, Room,
    RoomMutation, RoomRepository, UserId, VoiceChannelState, is_authorized,
};

use super::{
    collector::{CollectScope, CollectedInput, InputCollector},
    error::ControlError,
    operator_log::OperatorLog,
};

/// One activation of a room control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlRequest {
    pub interaction_id: InteractionId,
    pub guild_id: GuildId,
    /// Voice channel backing the room.
    pub channel_id: ChannelId,
    /// Text channel hosting the panel; follow-up input is read here.
    pub panel_channel_id: ChannelId,
    pub actor: Actor,
    pub action: ControlAction,
}

/// ルームのコントロール操作のユースケース
pub struct ControlRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    gateway: Arc<dyn PlatformGateway>,
    collector: Arc<InputCollector>,
    operator_log: OperatorLog,
    app_owner: Option<UserId>,
}

impl ControlRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        gateway: Arc<dyn PlatformGateway>,
        collector: Arc<InputCollector>,
        operator_log: OperatorLog,
        app_owner: Option<UserId>,
    ) -> Self {
        Self {
            repository,
            gateway,
            collector,
            operator_log,
            app_owner,
        }
    }

    /// Apply `request.action` to the room. `room` and `voice` are the states read
    /// by the caller for this activation.
    ///
    /// Returns the confirmation to show the actor.
    pub async fn execute(
        &self,
        request: &ControlRequest,
        room: &Room,
        voice: &VoiceChannelState,
    ) -> Result<String, ControlError> {
        if !is_authorized(room, &request.actor, self.app_owner.as_ref()) {
            tracing::info!(
                "{} is not allowed to use {} on {}",
                request.actor.user_id,
                request.action.token(),
                request.channel_id
            );
            return Err(ControlError::Unauthorized);
        }

        match request.action {
            ControlAction::Rename => self.rename(request).await,
            ControlAction::LimitPlus => self.change_limit(request, voice, true).await,
            ControlAction::LimitMinus => self.change_limit(request, voice, false).await,
            ControlAction::Privacy => self.toggle_privacy(request, voice).await,
            ControlAction::Trust => self.trust(request, true).await,
            ControlAction::Untrust => self.trust(request, false).await,
            ControlAction::Invite => self.invite(request, voice).await,
            ControlAction::Kick => self.kick(request, voice).await,
            ControlAction::BanVc => self.ban(request, voice).await,
            ControlAction::UnbanVc => self.unban(request, voice).await,
            ControlAction::Hide => self.set_hidden(request, voice, true).await,
            ControlAction::Reveal => self.set_hidden(request, voice, false).await,
            ControlAction::Claim => self.claim(request, voice).await,
            ControlAction::Transfer => self.transfer(request, voice).await,
            ControlAction::Delete => self.delete(request, voice).await,
            ControlAction::More => Ok(describe(room, voice)),
        }
    }

    async fn rename(&self, request: &ControlRequest) -> Result<String, ControlError> {
        let seconds = self.collector_seconds();
        let name = match self
            .prompt_and_collect(
                request,
                InputKind::NamePrefix,
                &format!(
                    "Type `name: New Room Name` in this channel within {seconds}s to rename."
                ),
            )
            .await
        {
            Some(CollectedInput::Name(name)) => name,
            _ => return Err(ControlError::InputTimeout("No name provided.".to_string())),
        };

        let new_name = name.clone();
        self.mutate(request, Box::new(move |room: &mut Room| room.rename(&new_name)))
            .await?;
        self.best_effort(
            "rename",
            self.gateway
                .set_channel_name(&request.guild_id, &request.channel_id, &name)
                .await,
        );
        self.operator_log.notify(format!(
            "🏷️ {} renamed {} -> {}",
            request.actor.tag, request.channel_id, name
        ));
        Ok(format!("✅ Renamed to **{name}**"))
    }

    /// The platform's current limit is the starting point.
    async fn change_limit(
        &self,
        request: &ControlRequest,
        voice: &VoiceChannelState,
        increase: bool,
    ) -> Result<String, ControlError> {
        let limit = if increase {
            voice.user_limit.increment()
        } else {
            voice.user_limit.decrement()
        };

        self.mutate(
            request,
            Box::new(move |room: &mut Room| {
                room.set_user_limit(limit);
                Ok(())
            }),
        )
        .await?;
        self.best_effort(
            "set user limit",
            self.gateway
                .set_user_limit(&request.guild_id, &request.channel_id, limit)
                .await,
        );

        let sign = if increase { "➕" } else { "➖" };
        self.operator_log.notify(format!(
            "{sign} {} limit set to {} by {}",
            voice.name, limit, request.actor.tag
        ));
        Ok(format!("{sign} Limit set to {limit}"))
    }

    async fn toggle_privacy(
        &self,
        request: &ControlRequest,
        voice: &VoiceChannelState,
    ) -> Result<String, ControlError> {
        let room = self
            .mutate(
                request,
                Box::new(|room: &mut Room| {
                    let private = !room.private;
                    room.set_private(private);
                    Ok(())
                }),
            )
            .await?;

        if room.private {
            self.apply_permission(
                request,
                PermissionTarget::DefaultRole,
                Permission::Connect,
                PermissionValue::Deny,
            )
            .await;
            for principal in room.connect_allow_list() {
                self.apply_permission(
                    request,
                    PermissionTarget::User(principal),
                    Permission::Connect,
                    PermissionValue::Allow,
                )
                .await;
            }
            self.operator_log.notify(format!(
                "🔐 {} set PRIVATE by {}",
                voice.name, request.actor.tag
            ));
            Ok("🔐 Channel set to PRIVATE".to_string())
        } else {
            self.apply_permission(
                request,
                PermissionTarget::DefaultRole,
                Permission::Connect,
                PermissionValue::Allow,
            )
            .await;
            self.operator_log.notify(format!(
                "🔓 {} set PUBLIC by {}",
                voice.name, request.actor.tag
            ));
            Ok("🔓 Channel set to PUBLIC".to_string())
        }
    }

    /// Trust and untrust always apply to the acting user.
    async fn trust(&self, request: &ControlRequest, trusted: bool) -> Result<String, ControlError> {
        let actor = request.actor.user_id.clone();
        self.mutate(
            request,
            Box::new(move |room: &mut Room| {
                if trusted {
                    room.trust(actor);
                } else {
                    room.untrust(&actor);
                }
                Ok(())
            }),
        )
        .await?;

        let tag = &request.actor.tag;
        if trusted {
            self.operator_log
                .notify(format!("🟩 {tag} trusted on {}", request.channel_id));
            Ok(format!("🟩 {tag} trusted."))
        } else {
            self.operator_log
                .notify(format!("⬜ {tag} untrusted on {}", request.channel_id));
            Ok(format!("⬜ {tag} untrusted."))
        }
    }

    async fn invite(
        &self,
        request: &ControlRequest,
        voice: &VoiceChannelState,
    ) -> Result<String, ControlError> {
        let target = self
            .collect_target(
                request,
                "Mention a user in this channel to send them an invite",
            )
            .await?;

        let notice = format!(
            "{} invited you to voice {}",
            request.actor.tag, voice.name
        );
        self.gateway
            .send_direct_message(&target.user_id, &notice)
            .await
            .map_err(|e| {
                tracing::info!("Invite DM to {} failed: {}", target.user_id, e);
                ControlError::InvalidTarget("Can't DM user.".to_string())
            })?;
        Ok(format!("✉️ Invite sent to {}", target.tag))
    }

    async fn kick(
        &self,
        request: &ControlRequest,
        voice: &VoiceChannelState,
    ) -> Result<String, ControlError> {
        let target = self
            .collect_target(request, "Mention a member to kick from the voice channel")
            .await?;

        let location = self
            .gateway
            .member_voice_channel(&request.guild_id, &target.user_id)
            .await?;
        if location.as_ref() != Some(&request.channel_id) {
            return Err(ControlError::InvalidTarget("Member not in VC.".to_string()));
        }

        self.gateway
            .disconnect_member(&request.guild_id, &target.user_id)
            .await?;
        self.operator_log.notify(format!(
            "👢 {} kicked from {} by {}",
            target.tag, voice.name, request.actor.tag
        ));
        Ok(format!("✅ Kicked {}", target.tag))
    }

    async fn ban(
        &self,
        request: &ControlRequest,
        voice: &VoiceChannelState,
    ) -> Result<String, ControlError> {
        let target = self
            .collect_target(request, "Mention a user to ban from the voice channel")
            .await?;

        let banned = target.user_id.clone();
        self.mutate(
            request,
            Box::new(move |room: &mut Room| room.ban(banned).map(|_| ())),
        )
        .await?;
        self.apply_permission(
            request,
            PermissionTarget::User(target.user_id.clone()),
            Permission::Connect,
            PermissionValue::Deny,
        )
        .await;
        self.operator_log.notify(format!(
            "⛔ {} banned from {} by {}",
            target.tag, voice.name, request.actor.tag
        ));
        Ok(format!("⛔ {} banned from VC", target.tag))
    }

    async fn unban(
        &self,
        request: &ControlRequest,
        voice: &VoiceChannelState,
    ) -> Result<String, ControlError> {
        let target = self
            .collect_target(request, "Mention a user to unban from the voice channel")
            .await?;

        let unbanned = target.user_id.clone();
        self.mutate(
            request,
            Box::new(move |room: &mut Room| {
                room.unban(&unbanned);
                Ok(())
            }),
        )
        .await?;
        self.apply_permission(
            request,
            PermissionTarget::User(target.user_id.clone()),
            Permission::Connect,
            PermissionValue::Unset,
        )
        .await;
        self.operator_log.notify(format!(
            "✅ {} unbanned from {} by {}",
            target.tag, voice.name, request.actor.tag
        ));
        Ok(format!("✅ {} unbanned.", target.tag))
    }

    async fn set_hidden(
        &self,
        request: &ControlRequest,
        voice: &VoiceChannelState,
        hidden: bool,
    ) -> Result<String, ControlError> {
        self.mutate(
            request,
            Box::new(move |room: &mut Room| {
                room.set_hidden(hidden);
                Ok(())
            }),
        )
        .await?;

        let value = if hidden {
            PermissionValue::Deny
        } else {
            PermissionValue::Allow
        };
        self.apply_permission(
            request,
            PermissionTarget::DefaultRole,
            Permission::ViewChannel,
            value,
        )
        .await;

        if hidden {
            self.operator_log
                .notify(format!("🙈 {} hidden by {}", voice.name, request.actor.tag));
            Ok("👻 Channel hidden.".to_string())
        } else {
            self.operator_log
                .notify(format!("👁 {} revealed by {}", voice.name, request.actor.tag));
            Ok("👁 Channel revealed.".to_string())
        }
    }

    /// Ownership moves to the actor, whoever owned the room before.
    async fn claim(
        &self,
        request: &ControlRequest,
        voice: &VoiceChannelState,
    ) -> Result<String, ControlError> {
        self.hand_over(request, request.actor.user_id.clone()).await?;
        self.operator_log.notify(format!(
            "👑 {} claimed {}",
            request.actor.tag, voice.name
        ));
        Ok("👑 You are now the owner.".to_string())
    }

    async fn transfer(
        &self,
        request: &ControlRequest,
        voice: &VoiceChannelState,
    ) -> Result<String, ControlError> {
        let target = self
            .collect_target(request, "Mention a user to transfer ownership to")
            .await?;

        self.hand_over(request, target.user_id.clone()).await?;
        self.operator_log.notify(format!(
            "🔁 Ownership of {} transferred to {}",
            voice.name, target.tag
        ));
        Ok(format!("🔁 Ownership transferred to {}", target.tag))
    }

    async fn delete(
        &self,
        request: &ControlRequest,
        voice: &VoiceChannelState,
    ) -> Result<String, ControlError> {
        self.repository
            .remove_room(&request.guild_id, &request.channel_id)
            .await?;
        self.best_effort(
            "delete channel",
            self.gateway
                .delete_channel(&request.guild_id, &request.channel_id)
                .await,
        );
        self.operator_log.notify(format!(
            "🗑️ [Delete] {} deleted by {}",
            voice.name, request.actor.tag
        ));
        Ok("🗑 Channel deleted.".to_string())
    }

    /// New owner loses any ban, and keeps connect access while the room is private.
    async fn hand_over(
        &self,
        request: &ControlRequest,
        owner: UserId,
    ) -> Result<Room, ControlError> {
        let new_owner = owner.clone();
        let room = self
            .mutate(
                request,
                Box::new(move |room: &mut Room| {
                    room.set_owner(new_owner);
                    Ok(())
                }),
            )
            .await?;

        let value = if room.private {
            PermissionValue::Allow
        } else {
            PermissionValue::Unset
        };
        self.apply_permission(
            request,
            PermissionTarget::User(owner),
            Permission::Connect,
            value,
        )
        .await;
        Ok(room)
    }

    async fn mutate(
        &self,
        request: &ControlRequest,
        mutation: RoomMutation,
    ) -> Result<Room, ControlError> {
        let room = self
            .repository
            .update_room(&request.guild_id, &request.channel_id, mutation)
            .await?;
        tracing::debug!(
            "{} applied {} to {}",
            request.actor.user_id,
            request.action.token(),
            request.channel_id
        );
        Ok(room)
    }

    async fn apply_permission(
        &self,
        request: &ControlRequest,
        target: PermissionTarget,
        permission: Permission,
        value: PermissionValue,
    ) {
        let result = self
            .gateway
            .set_permission(
                &request.guild_id,
                &request.channel_id,
                PermissionOverwrite {
                    target,
                    permission,
                    value,
                },
            )
            .await;
        self.best_effort("set permission", result);
    }

    fn best_effort(&self, what: &str, result: Result<(), GatewayError>) {
        if let Err(e) = result {
            tracing::warn!("Best-effort {} failed: {}", what, e);
        }
    }

    async fn collect_target(
        &self,
        request: &ControlRequest,
        instruction: &str,
    ) -> Result<Mention, ControlError> {
        let seconds = self.collector_seconds();
        match self
            .prompt_and_collect(
                request,
                InputKind::Mention,
                &format!("{instruction} ({seconds}s)."),
            )
            .await
        {
            Some(CollectedInput::Target(mention)) => Ok(mention),
            _ => Err(ControlError::InputTimeout("No mention.".to_string())),
        }
    }

    async fn prompt_and_collect(
        &self,
        request: &ControlRequest,
        kind: InputKind,
        prompt: &str,
    ) -> Option<CollectedInput> {
        if let Err(e) = self.gateway.respond(&request.interaction_id, prompt).await {
            tracing::debug!("Prompt for {} not delivered: {}", request.interaction_id, e);
        }
        self.collector
            .collect(
                CollectScope {
                    guild_id: request.guild_id.clone(),
                    channel_id: request.panel_channel_id.clone(),
                    author_id: request.actor.user_id.clone(),
                },
                kind,
            )
            .await
    }

    fn collector_seconds(&self) -> u64 {
        self.collector.window().as_secs()
    }
}

/// Read-only status summary.
fn describe(room: &Room, voice: &VoiceChannelState) -> String {
    let yes_no = |flag: bool| if flag { "Yes" } else { "No" };
    let co_owners = if room.co_owners.is_empty() {
        "none".to_string()
    } else {
        room.co_owners
            .iter()
            .map(UserId::mention)
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "⚙ **{}**\nOwner: {}\nCo-owners: {}\nLimit: {}\nMembers: {}\nPrivate: {}\nHidden: {}\nBanned: {}\nTrusted: {}",
        voice.name,
        room.owner.mention(),
        co_owners,
        voice.user_limit,
        voice.members.len(),
        yes_no(room.private),
        yes_no(room.hidden),
        room.banned.len(),
        room.trusted.len(),
    )
}
