//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! レジストリ本体はメモリ上に持ち、RoomStore は書き込み専用のミラーとして扱う。
//!
//! ## 永続化の順序
//!
//! 変更系の操作はロックを保持したまま保存まで完了させる。これにより保存の順序が
//! 変更の順序と一致し、古いスナップショットが新しいものを上書きすることはない。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ChannelId, GuildId, Registry, RepositoryError, Room, RoomMutation, RoomRepository, RoomStore,
};

/// インメモリ Room Repository 実装
pub struct InMemoryRoomRepository {
    registry: Mutex<Registry>,
    store: Arc<dyn RoomStore>,
}

impl InMemoryRoomRepository {
    pub fn new(registry: Registry, store: Arc<dyn RoomStore>) -> Self {
        Self {
            registry: Mutex::new(registry),
            store,
        }
    }

    /// Read the persisted snapshot once and serve from memory afterwards.
    pub async fn load(store: Arc<dyn RoomStore>) -> Self {
        let registry = store.load().await;
        Self::new(registry, store)
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn get_room(&self, guild: &GuildId, channel: &ChannelId) -> Option<Room> {
        let registry = self.registry.lock().await;
        registry.get(guild, channel).cloned()
    }

    async fn insert_room(
        &self,
        guild: GuildId,
        channel: ChannelId,
        room: Room,
    ) -> Result<(), RepositoryError> {
        let mut registry = self.registry.lock().await;
        registry.insert(guild, channel, room);
        self.store.save(&registry).await?;
        Ok(())
    }

    async fn update_room(
        &self,
        guild: &GuildId,
        channel: &ChannelId,
        mutation: RoomMutation,
    ) -> Result<Room, RepositoryError> {
        let mut registry = self.registry.lock().await;
        let room = registry
            .get_mut(guild, channel)
            .ok_or_else(|| RepositoryError::RoomNotFound(channel.to_string()))?;

        let mut updated = room.clone();
        mutation(&mut updated)?;
        *room = updated.clone();

        self.store.save(&registry).await?;
        Ok(updated)
    }

    async fn remove_room(
        &self,
        guild: &GuildId,
        channel: &ChannelId,
    ) -> Result<Option<Room>, RepositoryError> {
        let mut registry = self.registry.lock().await;
        let Some(removed) = registry.remove(guild, channel) else {
            return Ok(None);
        };
        self.store.save(&registry).await?;
        Ok(Some(removed))
    }

    async fn guild_rooms(&self, guild: &GuildId) -> Vec<(ChannelId, Room)> {
        let registry = self.registry.lock().await;
        registry
            .guild_rooms(guild)
            .map(|(channel, room)| (channel.clone(), room.clone()))
            .collect()
    }

    async fn count_rooms(&self) -> usize {
        let registry = self.registry.lock().await;
        registry.len()
    }
}
