//! Inbound platform events, already validated into domain types.

use super::{
    authorization::Actor,
    value_object::{ChannelId, GuildId, InteractionId, UserId},
};

/// A member's voice location changed (`None` = not connected).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceUpdate {
    pub guild_id: GuildId,
    pub user_id: UserId,
    pub username: String,
    pub old_channel: Option<ChannelId>,
    pub new_channel: Option<ChannelId>,
}

/// A control-surface button was activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonPress {
    pub interaction_id: InteractionId,
    /// `None` when activated outside a guild (e.g. a forwarded panel in DMs).
    pub guild_id: Option<GuildId>,
    /// Text channel hosting the panel; parameter collection listens here.
    pub channel_id: ChannelId,
    pub custom_id: String,
    pub actor: Actor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    pub user_id: UserId,
    pub tag: String,
}

/// A chat message posted in a text channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub guild_id: Option<GuildId>,
    pub channel_id: ChannelId,
    pub author_id: UserId,
    pub author_is_bot: bool,
    pub content: String,
    pub mentions: Vec<Mention>,
}
