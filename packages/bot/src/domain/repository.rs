//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    entity::{Registry, Room},
    error::{RepositoryError, RoomError, StoreError},
    value_object::{ChannelId, GuildId},
};

/// A change applied to one room as a single in-process step.
pub type RoomMutation = Box<dyn FnOnce(&mut Room) -> Result<(), RoomError> + Send>;

/// Room Registry trait
///
/// 稼働中ルームの唯一の正本。変更系メソッドは永続化の完了まで戻らない。
#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn get_room(&self, guild: &GuildId, channel: &ChannelId) -> Option<Room>;

    async fn insert_room(
        &self,
        guild: GuildId,
        channel: ChannelId,
        room: Room,
    ) -> Result<(), RepositoryError>;

    /// Apply `mutation` atomically; a rejected mutation leaves the room untouched.
    ///
    /// Returns the room as it is after the change.
    async fn update_room(
        &self,
        guild: &GuildId,
        channel: &ChannelId,
        mutation: RoomMutation,
    ) -> Result<Room, RepositoryError>;

    /// `Ok(None)` if nothing was registered for the channel.
    async fn remove_room(
        &self,
        guild: &GuildId,
        channel: &ChannelId,
    ) -> Result<Option<Room>, RepositoryError>;

    async fn guild_rooms(&self, guild: &GuildId) -> Vec<(ChannelId, Room)>;

    async fn count_rooms(&self) -> usize;
}

/// Durable Store trait
///
/// レジストリ全体の読み書きだけを担う。ロジックは持たない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Never fails: missing or unreadable data yields an empty registry.
    async fn load(&self) -> Registry;

    async fn save(&self, registry: &Registry) -> Result<(), StoreError>;
}
