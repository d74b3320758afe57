//! Control actions exposed on the control surface.
//!
//! Each button carries a stable identifier `<action>_<channelId>`; parsing it
//! back gives the action and the room it targets.

use super::{error::ParseActionError, value_object::ChannelId};

/// One of the 16 controls of a room's control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlAction {
    Rename,
    LimitPlus,
    LimitMinus,
    Privacy,
    Trust,
    Untrust,
    Invite,
    Kick,
    BanVc,
    UnbanVc,
    Hide,
    Reveal,
    Claim,
    Transfer,
    Delete,
    More,
}

/// Extra input an action needs before it can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// A message starting with `name:` (case-insensitive).
    NamePrefix,
    /// A message mentioning at least one user.
    Mention,
}

impl ControlAction {
    /// Panel order: four rows of four.
    pub const ALL: [ControlAction; 16] = [
        ControlAction::Rename,
        ControlAction::LimitPlus,
        ControlAction::LimitMinus,
        ControlAction::Privacy,
        ControlAction::Trust,
        ControlAction::Untrust,
        ControlAction::Invite,
        ControlAction::Kick,
        ControlAction::BanVc,
        ControlAction::UnbanVc,
        ControlAction::Hide,
        ControlAction::Reveal,
        ControlAction::Claim,
        ControlAction::Transfer,
        ControlAction::Delete,
        ControlAction::More,
    ];

    pub fn token(self) -> &'static str {
        match self {
            ControlAction::Rename => "rename",
            ControlAction::LimitPlus => "limit_plus",
            ControlAction::LimitMinus => "limit_minus",
            ControlAction::Privacy => "privacy",
            ControlAction::Trust => "trust",
            ControlAction::Untrust => "untrust",
            ControlAction::Invite => "invite",
            ControlAction::Kick => "kick",
            ControlAction::BanVc => "banvc",
            ControlAction::UnbanVc => "unbanvc",
            ControlAction::Hide => "hide",
            ControlAction::Reveal => "reveal",
            ControlAction::Claim => "claim",
            ControlAction::Transfer => "transfer",
            ControlAction::Delete => "delete",
            ControlAction::More => "more",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ControlAction::Rename => "🏷 Name",
            ControlAction::LimitPlus => "➕ Limit",
            ControlAction::LimitMinus => "➖ Limit",
            ControlAction::Privacy => "🔐 Private",
            ControlAction::Trust => "🟩 Trust",
            ControlAction::Untrust => "⬜ Untrust",
            ControlAction::Invite => "✉️ Invite",
            ControlAction::Kick => "👢 Kick",
            ControlAction::BanVc => "⛔ BanVC",
            ControlAction::UnbanVc => "✅ UnbanVC",
            ControlAction::Hide => "👻 Hide",
            ControlAction::Reveal => "👁 Reveal",
            ControlAction::Claim => "👑 Claim",
            ControlAction::Transfer => "🔁 Transfer",
            ControlAction::Delete => "🗑 Delete",
            ControlAction::More => "⚙ More",
        }
    }

    pub fn input_kind(self) -> Option<InputKind> {
        match self {
            ControlAction::Rename => Some(InputKind::NamePrefix),
            ControlAction::Invite
            | ControlAction::Kick
            | ControlAction::BanVc
            | ControlAction::UnbanVc
            | ControlAction::Transfer => Some(InputKind::Mention),
            _ => None,
        }
    }

    pub fn custom_id(self, channel: &ChannelId) -> String {
        format!("{}_{}", self.token(), channel)
    }

    /// Parse `<action>_<channelId>` back into its parts.
    pub fn parse_custom_id(custom_id: &str) -> Result<(Self, ChannelId), ParseActionError> {
        let (action, rest) = Self::ALL
            .iter()
            .find_map(|action| {
                custom_id
                    .strip_prefix(action.token())
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|rest| (*action, rest))
            })
            .ok_or_else(|| ParseActionError::UnknownAction(custom_id.to_string()))?;

        let channel = ChannelId::new(rest)
            .map_err(|_| ParseActionError::MissingChannel(custom_id.to_string()))?;
        Ok((action, channel))
    }
}
