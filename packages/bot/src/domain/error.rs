//! Domain-level error types.

use thiserror::Error;

/// Value Object のバリデーションエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{0} id must not be empty")]
    EmptyId(&'static str),
}

/// Room エンティティの不変条件違反
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    /// The owner can never be on the ban list.
    #[error("the room owner cannot be banned")]
    OwnerCannotBeBanned,

    #[error("room name must not be empty")]
    EmptyName,
}

/// Durable store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("failed to write room registry: {0}")]
    Io(String),

    #[error("failed to encode room registry: {0}")]
    Encode(String),
}

/// Room registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("room not registered: {0}")]
    RoomNotFound(String),

    #[error(transparent)]
    Rejected(#[from] RoomError),

    /// The in-memory change was applied but could not be persisted.
    #[error(transparent)]
    Persist(#[from] StoreError),
}

/// Platform gateway errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("gateway bridge is not connected")]
    Disconnected,

    #[error("gateway command timed out")]
    Timeout,

    /// The platform refused the command (missing permission, object gone, ...).
    #[error("platform rejected command: {0}")]
    Rejected(String),

    #[error("gateway protocol error: {0}")]
    Protocol(String),

    #[error("gateway bridge is already connected")]
    AlreadyConnected,
}

/// Control-surface identifier parse errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseActionError {
    #[error("unknown control action in '{0}'")]
    UnknownAction(String),

    #[error("missing room channel in '{0}'")]
    MissingChannel(String),
}
