//! Who may operate a room's controls.

use super::{entity::Room, value_object::UserId};

/// The user activating a control, with the platform capabilities that matter here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    /// Display tag used in responses and log lines.
    pub tag: String,
    /// Holds the platform "manage channels" capability in this guild.
    pub can_manage_channels: bool,
}

/// Owner, co-owner, channel manager, or the configured application owner.
pub fn is_authorized(room: &Room, actor: &Actor, app_owner: Option<&UserId>) -> bool {
    room.is_manager(&actor.user_id)
        || actor.can_manage_channels
        || app_owner.is_some_and(|owner| *owner == actor.user_id)
}
