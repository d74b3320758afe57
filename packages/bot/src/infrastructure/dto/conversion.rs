//! Conversion logic between DTOs and domain entities.

use std::collections::BTreeSet;

use crate::domain::{
    Actor, ButtonPress, ChannelId, ChatMessage, GuildId, InteractionId, Mention, Permission,
    PermissionTarget, PermissionValue, PresenceUpdate, Registry, Room, Timestamp, UserId,
    UserLimit, ValueObjectError, VoiceChannelState,
};
use crate::infrastructure::dto::{
    gateway::{
        ButtonPressedDto, ChannelStateDto, MentionDto, MessageCreatedDto, PermissionDto,
        PermissionTargetDto, PermissionValueDto, PresenceUpdateDto,
    },
    registry::{RegistryDocument, RoomRecord},
};

// ========================================
// DTO → Domain Entity
// ========================================

fn user_set(ids: Vec<String>) -> BTreeSet<UserId> {
    ids.into_iter().filter_map(|id| UserId::new(id).ok()).collect()
}

impl TryFrom<RoomRecord> for Room {
    type Error = ValueObjectError;

    fn try_from(record: RoomRecord) -> Result<Self, Self::Error> {
        let owner = UserId::new(record.owner)?;
        let mut banned = user_set(record.banned);
        // Older files may list the owner as banned; the owner wins.
        banned.remove(&owner);

        Ok(Self {
            owner,
            co_owners: user_set(record.co_owners),
            trusted: user_set(record.trusted),
            banned,
            locked: record.locked,
            private: record.private,
            hidden: record.hidden,
            user_limit: UserLimit::clamped(record.user_limit),
            backup_name: record.backup_name,
            created_at: Timestamp::new(record.created_at),
        })
    }
}

/// Build a registry from a document, skipping entries that cannot be valid rooms.
pub fn registry_from_document(document: RegistryDocument) -> Registry {
    let mut registry = Registry::new();
    for (guild, rooms) in document {
        let Ok(guild_id) = GuildId::new(guild.clone()) else {
            tracing::warn!("Skipping rooms of invalid guild id '{}'", guild);
            continue;
        };
        for (channel, record) in rooms {
            match (ChannelId::new(channel.clone()), Room::try_from(record)) {
                (Ok(channel_id), Ok(room)) => {
                    registry.insert(guild_id.clone(), channel_id, room);
                }
                _ => tracing::warn!(
                    "Skipping invalid room entry '{}' in guild '{}'",
                    channel,
                    guild
                ),
            }
        }
    }
    registry
}

/// Empty or missing ids both mean "no channel".
fn optional_channel(id: Option<String>) -> Result<Option<ChannelId>, ValueObjectError> {
    id.filter(|id| !id.trim().is_empty())
        .map(ChannelId::new)
        .transpose()
}

fn optional_guild(id: Option<String>) -> Result<Option<GuildId>, ValueObjectError> {
    id.filter(|id| !id.trim().is_empty())
        .map(GuildId::new)
        .transpose()
}

impl TryFrom<PresenceUpdateDto> for PresenceUpdate {
    type Error = ValueObjectError;

    fn try_from(dto: PresenceUpdateDto) -> Result<Self, Self::Error> {
        Ok(Self {
            guild_id: GuildId::new(dto.guild_id)?,
            user_id: UserId::new(dto.user_id)?,
            username: dto.username,
            old_channel: optional_channel(dto.old_channel_id)?,
            new_channel: optional_channel(dto.new_channel_id)?,
        })
    }
}

impl TryFrom<ButtonPressedDto> for ButtonPress {
    type Error = ValueObjectError;

    fn try_from(dto: ButtonPressedDto) -> Result<Self, Self::Error> {
        Ok(Self {
            interaction_id: InteractionId::new(dto.interaction_id)?,
            guild_id: optional_guild(dto.guild_id)?,
            channel_id: ChannelId::new(dto.channel_id)?,
            custom_id: dto.custom_id,
            actor: Actor {
                user_id: UserId::new(dto.user_id)?,
                tag: dto.user_tag,
                can_manage_channels: dto.can_manage_channels,
            },
        })
    }
}

impl TryFrom<MentionDto> for Mention {
    type Error = ValueObjectError;

    fn try_from(dto: MentionDto) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: UserId::new(dto.user_id)?,
            tag: dto.tag,
        })
    }
}

impl TryFrom<MessageCreatedDto> for ChatMessage {
    type Error = ValueObjectError;

    fn try_from(dto: MessageCreatedDto) -> Result<Self, Self::Error> {
        Ok(Self {
            guild_id: optional_guild(dto.guild_id)?,
            channel_id: ChannelId::new(dto.channel_id)?,
            author_id: UserId::new(dto.author_id)?,
            author_is_bot: dto.author_is_bot,
            content: dto.content,
            mentions: dto
                .mentions
                .into_iter()
                .map(Mention::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

impl TryFrom<ChannelStateDto> for VoiceChannelState {
    type Error = ValueObjectError;

    fn try_from(dto: ChannelStateDto) -> Result<Self, Self::Error> {
        Ok(Self {
            name: dto.name,
            user_limit: UserLimit::clamped(dto.user_limit),
            members: dto
                .members
                .into_iter()
                .map(UserId::new)
                .collect::<Result<_, _>>()?,
        })
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<PermissionTarget> for PermissionTargetDto {
    fn from(target: PermissionTarget) -> Self {
        match target {
            PermissionTarget::DefaultRole => Self::DefaultRole,
            PermissionTarget::User(user) => Self::User {
                user_id: user.into_string(),
            },
        }
    }
}

impl From<Permission> for PermissionDto {
    fn from(permission: Permission) -> Self {
        match permission {
            Permission::Connect => Self::Connect,
            Permission::ViewChannel => Self::ViewChannel,
        }
    }
}

impl From<PermissionValue> for PermissionValueDto {
    fn from(value: PermissionValue) -> Self {
        match value {
            PermissionValue::Allow => Self::Allow,
            PermissionValue::Deny => Self::Deny,
            PermissionValue::Unset => Self::Unset,
        }
    }
}

impl From<&Room> for RoomRecord {
    fn from(room: &Room) -> Self {
        let ids = |set: &BTreeSet<UserId>| set.iter().map(|id| id.as_str().to_string()).collect();
        Self {
            owner: room.owner.as_str().to_string(),
            co_owners: ids(&room.co_owners),
            created_at: room.created_at.value(),
            locked: room.locked,
            private: room.private,
            hidden: room.hidden,
            banned: ids(&room.banned),
            backup_name: room.backup_name.clone(),
            user_limit: i64::from(room.user_limit.value()),
            trusted: ids(&room.trusted),
        }
    }
}

pub fn registry_to_document(registry: &Registry) -> RegistryDocument {
    let mut document = RegistryDocument::new();
    for (guild, channel, room) in registry.iter() {
        document
            .entry(guild.as_str().to_string())
            .or_default()
            .insert(channel.as_str().to_string(), RoomRecord::from(room));
    }
    document
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY_FILE: &str = r#"{
      "111": {
        "222": {
          "owner": "333",
          "coowners": ["444", "444"],
          "createdAt": 1700000000000,
          "locked": false,
          "private": true,
          "banned": ["555", "333"],
          "backupName": "bob's Room",
          "userLimit": 150,
          "trusted": []
        }
      }
    }"#;

    #[test]
    fn test_presence_with_empty_channel_ids_means_not_connected() {
        // テスト項目: 空文字のチャンネル ID は「未接続」として扱われる
        // given (前提条件):
        let dto = PresenceUpdateDto {
            guild_id: "g".to_string(),
            user_id: "u".to_string(),
            username: "alice".to_string(),
            old_channel_id: Some(String::new()),
            new_channel_id: Some("lobby".to_string()),
        };

        // when (操作):
        let update = PresenceUpdate::try_from(dto).unwrap();

        // then (期待する結果):
        assert_eq!(update.old_channel, None);
        assert_eq!(update.new_channel, Some(ChannelId::new("lobby").unwrap()));
    }

    #[test]
    fn test_message_with_invalid_mention_is_rejected() {
        // テスト項目: 不正なメンションを含むメッセージは変換エラーになる
        let dto = MessageCreatedDto {
            guild_id: Some("g".to_string()),
            channel_id: "c".to_string(),
            author_id: "u".to_string(),
            author_is_bot: false,
            content: "hi".to_string(),
            mentions: vec![MentionDto {
                user_id: " ".to_string(),
                tag: String::new(),
            }],
        };

        assert_eq!(
            ChatMessage::try_from(dto),
            Err(ValueObjectError::EmptyId("user"))
        );
    }

    #[test]
    fn test_legacy_document_is_loaded() {
        // テスト項目: 既存デプロイのデータファイル形式を読み込める
        // given (前提条件):
        let document: RegistryDocument = serde_json::from_str(LEGACY_FILE).unwrap();

        // when (操作):
        let registry = registry_from_document(document);

        // then (期待する結果):
        let guild = GuildId::new("111").unwrap();
        let channel = ChannelId::new("222").unwrap();
        let room = registry.get(&guild, &channel).expect("room should be loaded");
        assert_eq!(room.owner.as_str(), "333");
        assert_eq!(room.co_owners.len(), 1, "duplicates collapse into a set");
        assert!(room.private);
        assert!(!room.hidden, "missing field defaults to false");
        assert_eq!(room.user_limit.value(), 99);
        assert_eq!(room.backup_name, "bob's Room");
        assert!(
            !room.banned.contains(&room.owner),
            "owner is never kept on the ban list"
        );
        assert_eq!(room.banned.len(), 1);
    }

    #[test]
    fn test_invalid_entries_are_skipped() {
        // テスト項目: 不正なエントリはスキップされ、他のエントリは残る
        // given (前提条件):
        let json = r#"{
          "111": {
            "222": { "owner": "" },
            "223": { "owner": "9" }
          },
          " ": { "1": { "owner": "9" } }
        }"#;
        let document: RegistryDocument = serde_json::from_str(json).unwrap();

        // when (操作):
        let registry = registry_from_document(document);

        // then (期待する結果):
        assert_eq!(registry.len(), 1);
        assert!(
            registry
                .get(&GuildId::new("111").unwrap(), &ChannelId::new("223").unwrap())
                .is_some()
        );
    }

    #[test]
    fn test_document_uses_legacy_field_names() {
        // テスト項目: 書き出し時のフィールド名が既存形式と一致する
        // given (前提条件):
        let mut registry = Registry::new();
        registry.insert(
            GuildId::new("g").unwrap(),
            ChannelId::new("c").unwrap(),
            Room::new(
                UserId::new("u").unwrap(),
                "u's Room",
                UserLimit::UNLIMITED,
                Timestamp::new(5),
            ),
        );

        // when (操作):
        let json = serde_json::to_value(registry_to_document(&registry)).unwrap();

        // then (期待する結果):
        let record = &json["g"]["c"];
        assert_eq!(record["owner"], "u");
        assert_eq!(record["coowners"], serde_json::json!([]));
        assert_eq!(record["createdAt"], 5);
        assert_eq!(record["backupName"], "u's Room");
        assert_eq!(record["userLimit"], 0);
    }
}
