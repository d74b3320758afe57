//! Domain layer: rooms, access-control rules and the ports the use cases need.

pub mod action;
pub mod authorization;
pub mod cooldown;
pub mod entity;
pub mod error;
pub mod event;
pub mod gateway;
pub mod panel;
pub mod repository;
pub mod value_object;

pub use action::{ControlAction, InputKind};
pub use authorization::{Actor, is_authorized};
pub use cooldown::CooldownLedger;
pub use entity::{Registry, Room};
pub use error::{
    GatewayError, ParseActionError, RepositoryError, RoomError, StoreError, ValueObjectError,
};
pub use event::{ButtonPress, ChatMessage, Mention, PresenceUpdate};
pub use gateway::{
    NewVoiceChannel, Permission, PermissionOverwrite, PermissionTarget, PermissionValue,
    PlatformGateway, VoiceChannelState,
};
pub use panel::ControlPanel;
#[cfg(test)]
pub use repository::MockRoomStore;
pub use repository::{RoomMutation, RoomRepository, RoomStore};
pub use value_object::{ChannelId, GuildId, InteractionId, Timestamp, UserId, UserLimit};
