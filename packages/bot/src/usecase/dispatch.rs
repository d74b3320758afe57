//! UseCase: Command Dispatcher
//!
//! ボタン操作を解釈し、対象ルームを特定して Access-Control Engine に渡す。
//! 結果（成功・失敗とも）は操作者にだけ応答する。

use std::sync::Arc;

use crate::domain::{ButtonPress, ControlAction, PlatformGateway, RoomRepository};

use super::{
    control::{ControlRequest, ControlRoomUseCase},
    error::ControlError,
};

pub struct DispatchControlUseCase {
    repository: Arc<dyn RoomRepository>,
    gateway: Arc<dyn PlatformGateway>,
    control: Arc<ControlRoomUseCase>,
}

impl DispatchControlUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        gateway: Arc<dyn PlatformGateway>,
        control: Arc<ControlRoomUseCase>,
    ) -> Self {
        Self {
            repository,
            gateway,
            control,
        }
    }

    /// Route one button press and answer the actor.
    pub async fn execute(&self, press: ButtonPress) -> Result<String, ControlError> {
        let outcome = self.route(&press).await;
        let answer = match &outcome {
            Ok(confirmation) => confirmation.clone(),
            Err(e) => format!("❌ {e}"),
        };
        if let Err(e) = self.gateway.respond(&press.interaction_id, &answer).await {
            tracing::debug!("Answer to {} not delivered: {}", press.interaction_id, e);
        }
        outcome
    }

    async fn route(&self, press: &ButtonPress) -> Result<String, ControlError> {
        let (action, channel) = ControlAction::parse_custom_id(&press.custom_id).map_err(|e| {
            tracing::debug!("Ignoring control {}: {}", press.custom_id, e);
            ControlError::NotFound("Unknown control.".to_string())
        })?;
        let guild = press
            .guild_id
            .clone()
            .ok_or_else(|| ControlError::NotFound("Guild error.".to_string()))?;

        let room = self
            .repository
            .get_room(&guild, &channel)
            .await
            .ok_or_else(|| ControlError::NotFound("Channel not registered.".to_string()))?;

        let Some(voice) = self.gateway.channel_state(&guild, &channel).await? else {
            // the channel is gone; drop the stale entry
            match self.repository.remove_room(&guild, &channel).await {
                Ok(_) => {
                    tracing::info!("Room {} vanished from the platform, entry dropped", channel)
                }
                Err(e) => tracing::error!("Failed to persist removal of {}: {}", channel, e),
            }
            return Err(ControlError::NotFound("Channel not found.".to_string()));
        };

        let request = ControlRequest {
            interaction_id: press.interaction_id.clone(),
            guild_id: guild,
            channel_id: channel,
            panel_channel_id: press.channel_id.clone(),
            actor: press.actor.clone(),
            action,
        };
        self.control.execute(&request, &room, &voice).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            Actor, ChannelId, GuildId, InteractionId, MockRoomStore, Registry, Room, Timestamp,
            UserId, UserLimit,
        },
        infrastructure::repository::InMemoryRoomRepository,
        usecase::{collector::InputCollector, operator_log::OperatorLog, testing::FakeGateway},
    };
    use std::time::Duration;

    struct Fixture {
        usecase: DispatchControlUseCase,
        repository: Arc<InMemoryRoomRepository>,
        gateway: Arc<FakeGateway>,
    }

    fn guild() -> GuildId {
        GuildId::new("guild").unwrap()
    }

    fn room_id() -> ChannelId {
        ChannelId::new("room-1").unwrap()
    }

    async fn fixture() -> Fixture {
        let mut store = MockRoomStore::new();
        store.expect_save().returning(|_| Ok(()));
        let repository = Arc::new(InMemoryRoomRepository::new(Registry::new(), Arc::new(store)));
        repository
            .insert_room(
                guild(),
                room_id(),
                Room::new(
                    UserId::new("owner").unwrap(),
                    "owner's Room",
                    UserLimit::UNLIMITED,
                    Timestamp::new(0),
                ),
            )
            .await
            .unwrap();
        let gateway = Arc::new(FakeGateway::new());
        gateway.add_channel(&room_id(), "owner's Room");

        let control = Arc::new(ControlRoomUseCase::new(
            repository.clone(),
            gateway.clone(),
            Arc::new(InputCollector::new(Duration::from_secs(30))),
            OperatorLog::new(gateway.clone(), None),
            None,
        ));
        Fixture {
            usecase: DispatchControlUseCase::new(repository.clone(), gateway.clone(), control),
            repository,
            gateway,
        }
    }

    fn press(custom_id: &str, who: &str) -> ButtonPress {
        ButtonPress {
            interaction_id: InteractionId::new("interaction").unwrap(),
            guild_id: Some(guild()),
            channel_id: ChannelId::new("panels").unwrap(),
            custom_id: custom_id.to_string(),
            actor: Actor {
                user_id: UserId::new(who).unwrap(),
                tag: format!("{who}#0001"),
                can_manage_channels: false,
            },
        }
    }

    #[tokio::test]
    async fn test_press_is_routed_and_answered() {
        // テスト項目: ボタン操作がルームに適用され、結果が操作者へ応答される
        // given (前提条件):
        let f = fixture().await;

        // when (操作):
        let result = f.usecase.execute(press("hide_room-1", "owner")).await;

        // then (期待する結果):
        assert_eq!(result, Ok("👻 Channel hidden.".to_string()));
        assert_eq!(f.gateway.responses(), vec!["👻 Channel hidden.".to_string()]);
        assert!(f.repository.get_room(&guild(), &room_id()).await.unwrap().hidden);
    }

    #[tokio::test]
    async fn test_unauthorized_press_is_answered_with_rejection() {
        // テスト項目: 権限のない操作は拒否応答のみで、プラットフォームへのコマンドは発行されない
        let f = fixture().await;

        let result = f.usecase.execute(press("delete_room-1", "stranger")).await;

        assert_eq!(result, Err(ControlError::Unauthorized));
        assert_eq!(
            f.gateway.responses(),
            vec!["❌ You don't have permission.".to_string()]
        );
        assert!(f.gateway.platform_commands().is_empty());
        assert!(f.repository.get_room(&guild(), &room_id()).await.is_some());
    }

    #[tokio::test]
    async fn test_unregistered_channel_is_not_found() {
        // テスト項目: 未登録のチャンネルへの操作は NotFound
        let f = fixture().await;

        let result = f.usecase.execute(press("hide_999", "owner")).await;

        assert_eq!(
            result,
            Err(ControlError::NotFound("Channel not registered.".to_string()))
        );
    }

    #[tokio::test]
    async fn test_vanished_channel_is_not_found_and_reconciled() {
        // テスト項目: プラットフォーム上にないチャンネルは NotFound となり、エントリが回収される
        // given (前提条件):
        let f = fixture().await;
        f.gateway.delete_channel(&guild(), &room_id()).await.unwrap();

        // when (操作):
        let result = f.usecase.execute(press("hide_room-1", "owner")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ControlError::NotFound("Channel not found.".to_string()))
        );
        assert!(f.repository.get_room(&guild(), &room_id()).await.is_none());
    }

    #[tokio::test]
    async fn test_press_outside_guild_is_rejected() {
        // テスト項目: ギルド外からの操作は拒否される
        let f = fixture().await;
        let mut outside = press("hide_room-1", "owner");
        outside.guild_id = None;

        let result = f.usecase.execute(outside).await;

        assert_eq!(result, Err(ControlError::NotFound("Guild error.".to_string())));
    }

    #[tokio::test]
    async fn test_malformed_custom_id_is_rejected() {
        // テスト項目: 解釈できないボタン ID は拒否される
        let f = fixture().await;

        let result = f.usecase.execute(press("launch_room-1", "owner")).await;

        assert_eq!(result, Err(ControlError::NotFound("Unknown control.".to_string())));
        assert_eq!(f.gateway.responses(), vec!["❌ Unknown control.".to_string()]);
    }
}
