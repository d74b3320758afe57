//! Value Objects
//!
//! プラットフォーム側の識別子と、ルームの人数制限を表す値オブジェクト。

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ValueObjectError;

macro_rules! platform_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create an identifier, rejecting empty or whitespace-only input.
            pub fn new(value: impl Into<String>) -> Result<Self, ValueObjectError> {
                let value = value.into();
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(ValueObjectError::EmptyId($label));
                }
                if trimmed.len() != value.len() {
                    return Ok(Self(trimmed.to_string()));
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

platform_id!(
    /// Guild (workspace) identifier; scopes every room.
    GuildId,
    "guild"
);
platform_id!(
    /// Channel identifier (voice room, lobby, category or text channel).
    ChannelId,
    "channel"
);
platform_id!(
    /// User identifier.
    UserId,
    "user"
);
platform_id!(
    /// Identifier of one control-surface activation, used to answer it privately.
    InteractionId,
    "interaction"
);

impl UserId {
    /// Mention markup understood by the platform, e.g. `<@123>`.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.0)
    }
}

/// Connection capacity of a room. `0` means unlimited.
///
/// Always within `[0, 99]`; arithmetic saturates at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct UserLimit(u8);

impl UserLimit {
    pub const MAX: u8 = 99;
    pub const UNLIMITED: UserLimit = UserLimit(0);

    /// Clamp an arbitrary integer into the valid range.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(0, i64::from(Self::MAX)) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn increment(self) -> Self {
        Self::clamped(i64::from(self.0) + 1)
    }

    pub fn decrement(self) -> Self {
        Self::clamped(i64::from(self.0) - 1)
    }
}

impl From<i64> for UserLimit {
    fn from(value: i64) -> Self {
        Self::clamped(value)
    }
}

impl From<UserLimit> for u8 {
    fn from(limit: UserLimit) -> Self {
        limit.0
    }
}

impl fmt::Display for UserLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unix timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(self) -> i64 {
        self.0
    }
}
