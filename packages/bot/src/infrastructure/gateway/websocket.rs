//! WebSocket ブリッジを使った PlatformGateway 実装
//!
//! ## 責務
//!
//! - 接続中のブリッジの `UnboundedSender` を管理
//! - コマンドを JSON フレームとして送信し、`request_id` で結果と突き合わせる
//!
//! ## 設計ノート
//!
//! WebSocket の受け付けは UI 層（`ui/handler/gateway.rs`）で行われます。
//! この実装は生成された sender を受け取り、コマンド送信と結果待ちに使用します。
//! ブリッジは同時に 1 つだけ接続できます。

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc, oneshot};
use uuid::Uuid;

use crate::{
    domain::{
        ChannelId, ControlPanel, GatewayError, GuildId, InteractionId, NewVoiceChannel,
        PermissionOverwrite, PlatformGateway, UserId, UserLimit, VoiceChannelState,
    },
    infrastructure::dto::gateway::{CommandDto, CommandResultDto, OutboundFrame},
};

/// Outbound half of the bridge connection (serialized frames).
pub type BridgeSender = mpsc::UnboundedSender<String>;

pub struct WebSocketGateway {
    bridge: Mutex<Option<BridgeSender>>,
    pending: Mutex<HashMap<Uuid, oneshot::Sender<CommandResultDto>>>,
    command_timeout: Duration,
}

impl WebSocketGateway {
    pub fn new(command_timeout: Duration) -> Self {
        Self {
            bridge: Mutex::new(None),
            pending: Mutex::new(HashMap::new()),
            command_timeout,
        }
    }

    /// Register the bridge connection. Fails while another bridge is attached.
    pub async fn attach(&self, sender: BridgeSender) -> Result<(), GatewayError> {
        let mut bridge = self.bridge.lock().await;
        if bridge.as_ref().is_some_and(|current| !current.is_closed()) {
            return Err(GatewayError::AlreadyConnected);
        }
        *bridge = Some(sender);
        tracing::info!("Gateway bridge attached");
        Ok(())
    }

    /// Unregister `sender` if it is still the attached bridge.
    ///
    /// Commands waiting on that bridge fail with `Disconnected`.
    pub async fn detach(&self, sender: &BridgeSender) {
        let mut bridge = self.bridge.lock().await;
        if !bridge
            .as_ref()
            .is_some_and(|current| current.same_channel(sender))
        {
            return;
        }
        *bridge = None;
        let dropped = {
            let mut pending = self.pending.lock().await;
            let count = pending.len();
            pending.clear();
            count
        };
        tracing::info!(
            "Gateway bridge detached ({} pending command(s) failed)",
            dropped
        );
    }

    pub async fn is_connected(&self) -> bool {
        let bridge = self.bridge.lock().await;
        bridge.as_ref().is_some_and(|current| !current.is_closed())
    }

    /// Hand a command result to its waiting caller.
    ///
    /// Returns `false` for unknown or already expired request ids.
    pub async fn resolve(&self, result: CommandResultDto) -> bool {
        let waiter = self.pending.lock().await.remove(&result.request_id);
        match waiter {
            Some(waiter) => waiter.send(result).is_ok(),
            None => {
                tracing::debug!("Dropping result for unknown request {}", result.request_id);
                false
            }
        }
    }

    async fn request(&self, command: CommandDto) -> Result<CommandResultDto, GatewayError> {
        let request_id = Uuid::new_v4();
        let frame = serde_json::to_string(&OutboundFrame::Command {
            request_id,
            command,
        })
        .map_err(|e| GatewayError::Protocol(e.to_string()))?;

        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(request_id, tx);

        let sent = {
            let bridge = self.bridge.lock().await;
            bridge
                .as_ref()
                .is_some_and(|sender| sender.send(frame).is_ok())
        };
        if !sent {
            self.pending.lock().await.remove(&request_id);
            return Err(GatewayError::Disconnected);
        }

        let result = match tokio::time::timeout(self.command_timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => return Err(GatewayError::Disconnected),
            Err(_) => {
                self.pending.lock().await.remove(&request_id);
                tracing::warn!("Gateway command {} timed out", request_id);
                return Err(GatewayError::Timeout);
            }
        };

        if result.ok {
            Ok(result)
        } else {
            Err(GatewayError::Rejected(
                result
                    .error
                    .unwrap_or_else(|| "no reason given".to_string()),
            ))
        }
    }

    async fn execute(&self, command: CommandDto) -> Result<(), GatewayError> {
        self.request(command).await.map(|_| ())
    }
}

fn channel_from_result(result: CommandResultDto) -> Result<Option<ChannelId>, GatewayError> {
    result
        .channel_id
        .filter(|id| !id.trim().is_empty())
        .map(ChannelId::new)
        .transpose()
        .map_err(|e| GatewayError::Protocol(e.to_string()))
}

#[async_trait]
impl PlatformGateway for WebSocketGateway {
    async fn create_voice_channel(
        &self,
        guild: &GuildId,
        channel: NewVoiceChannel,
    ) -> Result<ChannelId, GatewayError> {
        let result = self
            .request(CommandDto::CreateVoiceChannel {
                guild_id: guild.to_string(),
                category_id: channel.category_id.into_string(),
                name: channel.name,
                bitrate: channel.bitrate,
                user_limit: channel.user_limit.value(),
            })
            .await?;
        channel_from_result(result)?
            .ok_or_else(|| GatewayError::Protocol("create result without channel_id".to_string()))
    }

    async fn delete_channel(
        &self,
        guild: &GuildId,
        channel: &ChannelId,
    ) -> Result<(), GatewayError> {
        self.execute(CommandDto::DeleteChannel {
            guild_id: guild.to_string(),
            channel_id: channel.to_string(),
        })
        .await
    }

    async fn channel_state(
        &self,
        guild: &GuildId,
        channel: &ChannelId,
    ) -> Result<Option<VoiceChannelState>, GatewayError> {
        let result = self
            .request(CommandDto::GetChannelState {
                guild_id: guild.to_string(),
                channel_id: channel.to_string(),
            })
            .await?;
        result
            .channel
            .map(VoiceChannelState::try_from)
            .transpose()
            .map_err(|e| GatewayError::Protocol(e.to_string()))
    }

    async fn member_voice_channel(
        &self,
        guild: &GuildId,
        user: &UserId,
    ) -> Result<Option<ChannelId>, GatewayError> {
        let result = self
            .request(CommandDto::GetMemberVoiceChannel {
                guild_id: guild.to_string(),
                user_id: user.to_string(),
            })
            .await?;
        channel_from_result(result)
    }

    async fn set_channel_name(
        &self,
        guild: &GuildId,
        channel: &ChannelId,
        name: &str,
    ) -> Result<(), GatewayError> {
        self.execute(CommandDto::SetChannelName {
            guild_id: guild.to_string(),
            channel_id: channel.to_string(),
            name: name.to_string(),
        })
        .await
    }

    async fn set_user_limit(
        &self,
        guild: &GuildId,
        channel: &ChannelId,
        limit: UserLimit,
    ) -> Result<(), GatewayError> {
        self.execute(CommandDto::SetUserLimit {
            guild_id: guild.to_string(),
            channel_id: channel.to_string(),
            user_limit: limit.value(),
        })
        .await
    }

    async fn set_permission(
        &self,
        guild: &GuildId,
        channel: &ChannelId,
        overwrite: PermissionOverwrite,
    ) -> Result<(), GatewayError> {
        self.execute(CommandDto::SetPermission {
            guild_id: guild.to_string(),
            channel_id: channel.to_string(),
            target: overwrite.target.into(),
            permission: overwrite.permission.into(),
            value: overwrite.value.into(),
        })
        .await
    }

    async fn move_member(
        &self,
        guild: &GuildId,
        user: &UserId,
        channel: &ChannelId,
    ) -> Result<(), GatewayError> {
        self.execute(CommandDto::MoveMember {
            guild_id: guild.to_string(),
            user_id: user.to_string(),
            channel_id: channel.to_string(),
        })
        .await
    }

    async fn disconnect_member(&self, guild: &GuildId, user: &UserId) -> Result<(), GatewayError> {
        self.execute(CommandDto::DisconnectMember {
            guild_id: guild.to_string(),
            user_id: user.to_string(),
        })
        .await
    }

    async fn send_direct_message(&self, user: &UserId, content: &str) -> Result<(), GatewayError> {
        self.execute(CommandDto::SendDirectMessage {
            user_id: user.to_string(),
            content: content.to_string(),
        })
        .await
    }

    async fn send_message(&self, channel: &ChannelId, content: &str) -> Result<(), GatewayError> {
        self.execute(CommandDto::SendMessage {
            channel_id: channel.to_string(),
            content: content.to_string(),
        })
        .await
    }

    async fn post_control_panel(
        &self,
        channel: &ChannelId,
        panel: &ControlPanel,
    ) -> Result<(), GatewayError> {
        self.execute(CommandDto::PostControlPanel {
            channel_id: channel.to_string(),
            panel: panel.clone(),
        })
        .await
    }

    async fn respond(
        &self,
        interaction: &InteractionId,
        content: &str,
    ) -> Result<(), GatewayError> {
        self.execute(CommandDto::Respond {
            interaction_id: interaction.to_string(),
            content: content.to_string(),
        })
        .await
    }
}
