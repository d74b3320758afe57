//! UseCase: 稼働中ルームの一覧取得

use std::sync::Arc;

use crate::domain::{ChannelId, GuildId, Room, RoomRepository};

pub struct ListRoomsUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl ListRoomsUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// Rooms of `guild`, ordered by creation time.
    pub async fn execute(&self, guild: &GuildId) -> Vec<(ChannelId, Room)> {
        let mut rooms = self.repository.guild_rooms(guild).await;
        rooms.sort_by_key(|(channel, room)| (room.created_at.value(), channel.clone()));
        rooms
    }

    pub async fn count(&self) -> usize {
        self.repository.count_rooms().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MockRoomStore, Registry, Timestamp, UserId, UserLimit},
        infrastructure::repository::InMemoryRoomRepository,
    };

    #[tokio::test]
    async fn test_rooms_are_listed_oldest_first() {
        // テスト項目: ギルドのルームが作成順に返され、他ギルドのルームは含まれない
        // given (前提条件):
        let mut registry = Registry::new();
        let guild = GuildId::new("g").unwrap();
        let room = |owner: &str, created: i64| {
            Room::new(
                UserId::new(owner).unwrap(),
                format!("{owner}'s Room"),
                UserLimit::UNLIMITED,
                Timestamp::new(created),
            )
        };
        registry.insert(guild.clone(), ChannelId::new("a").unwrap(), room("late", 200));
        registry.insert(guild.clone(), ChannelId::new("b").unwrap(), room("early", 100));
        registry.insert(
            GuildId::new("other").unwrap(),
            ChannelId::new("c").unwrap(),
            room("elsewhere", 50),
        );
        let usecase = ListRoomsUseCase::new(Arc::new(InMemoryRoomRepository::new(
            registry,
            Arc::new(MockRoomStore::new()),
        )));

        // when (操作):
        let rooms = usecase.execute(&guild).await;

        // then (期待する結果):
        let owners: Vec<_> = rooms.iter().map(|(_, room)| room.owner.as_str()).collect();
        assert_eq!(owners, vec!["early", "late"]);
        assert_eq!(usecase.count().await, 3);
    }
}
