//! UseCase 層のエラー型
//!
//! `ControlError` の Display 文字列はそのまま操作者への応答として使われる。

use thiserror::Error;

use crate::domain::{ChannelId, GatewayError, RepositoryError};

/// Failure of one control activation, answered privately to the actor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("You don't have permission.")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    /// The collection window closed without a qualifying message.
    #[error("{0}")]
    InputTimeout(String),

    #[error("{0}")]
    InvalidTarget(String),

    #[error("Platform command failed: {0}")]
    Platform(GatewayError),

    #[error("Failed to save room state: {0}")]
    Storage(RepositoryError),
}

impl From<RepositoryError> for ControlError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::RoomNotFound(_) => {
                ControlError::NotFound("Channel not registered.".to_string())
            }
            RepositoryError::Rejected(rejected) => {
                ControlError::InvalidTarget(rejected.to_string())
            }
            other => ControlError::Storage(other),
        }
    }
}

impl From<GatewayError> for ControlError {
    fn from(error: GatewayError) -> Self {
        ControlError::Platform(error)
    }
}

/// Room creation failures. None of them leave a registry entry behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateRoomError {
    #[error("user {0} is cooling down")]
    CoolingDown(String),

    #[error("room category is not configured")]
    NotConfigured,

    #[error("failed to create voice channel: {0}")]
    Platform(#[from] GatewayError),

    #[error("failed to register room: {0}")]
    Storage(#[from] RepositoryError),

    /// The new room had no members once registered and was destroyed again.
    #[error("room {0} was empty after creation")]
    Abandoned(ChannelId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RoomError, StoreError};

    #[test]
    fn test_unregistered_room_maps_to_not_found() {
        // テスト項目: 未登録ルームは NotFound として操作者に伝わる
        let error = ControlError::from(RepositoryError::RoomNotFound("123".to_string()));
        assert_eq!(
            error,
            ControlError::NotFound("Channel not registered.".to_string())
        );
        assert_eq!(error.to_string(), "Channel not registered.");
    }

    #[test]
    fn test_rejected_mutation_maps_to_invalid_target() {
        // テスト項目: ルームの不変条件違反は InvalidTarget になる
        let error = ControlError::from(RepositoryError::Rejected(RoomError::OwnerCannotBeBanned));
        assert_eq!(
            error,
            ControlError::InvalidTarget("the room owner cannot be banned".to_string())
        );
    }

    #[test]
    fn test_persist_failure_maps_to_storage() {
        // テスト項目: 保存失敗は Storage エラーになる
        let error = ControlError::from(RepositoryError::Persist(StoreError::Io(
            "disk full".to_string(),
        )));
        assert!(matches!(error, ControlError::Storage(_)));
    }
}
