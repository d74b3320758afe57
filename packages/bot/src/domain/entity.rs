//! Entities: `Room` and the `Registry` of active rooms.

use std::collections::{BTreeMap, BTreeSet};

use super::{
    error::RoomError,
    value_object::{ChannelId, GuildId, Timestamp, UserId, UserLimit},
};

/// An ephemeral voice room and its access-control attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub owner: UserId,
    pub co_owners: BTreeSet<UserId>,
    /// Informational only; no authorization rule reads it.
    pub trusted: BTreeSet<UserId>,
    pub banned: BTreeSet<UserId>,
    pub locked: bool,
    pub private: bool,
    pub hidden: bool,
    pub user_limit: UserLimit,
    /// Last display name set through the control surface.
    pub backup_name: String,
    pub created_at: Timestamp,
}

impl Room {
    pub fn new(
        owner: UserId,
        name: impl Into<String>,
        user_limit: UserLimit,
        created_at: Timestamp,
    ) -> Self {
        Self {
            owner,
            co_owners: BTreeSet::new(),
            trusted: BTreeSet::new(),
            banned: BTreeSet::new(),
            locked: false,
            private: false,
            hidden: false,
            user_limit,
            backup_name: name.into(),
            created_at,
        }
    }

    /// Owner or co-owner of this room.
    pub fn is_manager(&self, user: &UserId) -> bool {
        self.owner == *user || self.co_owners.contains(user)
    }

    /// Principals that keep connect access while the room is private.
    pub fn connect_allow_list(&self) -> Vec<UserId> {
        std::iter::once(self.owner.clone())
            .chain(
                self.co_owners
                    .iter()
                    .filter(|id| **id != self.owner && !self.banned.contains(*id))
                    .cloned(),
            )
            .collect()
    }

    /// Hand ownership to `user`. Returns `true` if the user had to be unbanned.
    pub fn set_owner(&mut self, user: UserId) -> bool {
        let was_banned = self.banned.remove(&user);
        self.owner = user;
        was_banned
    }

    /// Returns `true` when the user was not banned before.
    ///
    /// A banned co-owner loses co-ownership.
    pub fn ban(&mut self, user: UserId) -> Result<bool, RoomError> {
        if user == self.owner {
            return Err(RoomError::OwnerCannotBeBanned);
        }
        self.co_owners.remove(&user);
        Ok(self.banned.insert(user))
    }

    pub fn unban(&mut self, user: &UserId) -> bool {
        self.banned.remove(user)
    }

    pub fn trust(&mut self, user: UserId) -> bool {
        self.trusted.insert(user)
    }

    pub fn untrust(&mut self, user: &UserId) -> bool {
        self.trusted.remove(user)
    }

    /// Private and locked move together: both mean "block unauthorized connects".
    pub fn set_private(&mut self, private: bool) {
        self.private = private;
        self.locked = private;
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub fn rename(&mut self, name: &str) -> Result<(), RoomError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RoomError::EmptyName);
        }
        self.backup_name = name.to_string();
        Ok(())
    }

    pub fn set_user_limit(&mut self, limit: UserLimit) {
        self.user_limit = limit;
    }
}

/// All active rooms, keyed by guild then by backing channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    guilds: BTreeMap<GuildId, BTreeMap<ChannelId, Room>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, guild: &GuildId, channel: &ChannelId) -> Option<&Room> {
        self.guilds.get(guild).and_then(|rooms| rooms.get(channel))
    }

    pub fn get_mut(&mut self, guild: &GuildId, channel: &ChannelId) -> Option<&mut Room> {
        self.guilds.get_mut(guild).and_then(|rooms| rooms.get_mut(channel))
    }

    pub fn insert(&mut self, guild: GuildId, channel: ChannelId, room: Room) -> Option<Room> {
        self.guilds.entry(guild).or_default().insert(channel, room)
    }

    /// Remove a room; a guild left without rooms is dropped as well.
    pub fn remove(&mut self, guild: &GuildId, channel: &ChannelId) -> Option<Room> {
        let rooms = self.guilds.get_mut(guild)?;
        let removed = rooms.remove(channel);
        if rooms.is_empty() {
            self.guilds.remove(guild);
        }
        removed
    }

    pub fn guild_rooms(&self, guild: &GuildId) -> impl Iterator<Item = (&ChannelId, &Room)> {
        self.guilds.get(guild).into_iter().flat_map(|rooms| rooms.iter())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GuildId, &ChannelId, &Room)> {
        self.guilds.iter().flat_map(|(guild, rooms)| {
            rooms.iter().map(move |(channel, room)| (guild, channel, room))
        })
    }

    pub fn len(&self) -> usize {
        self.guilds.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.guilds.is_empty()
    }
}
