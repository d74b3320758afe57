//! Per-user rate limit on room creation.

use std::collections::HashMap;

use super::value_object::{Timestamp, UserId};

/// Last creation time per user; lives for the process lifetime only.
#[derive(Debug, Clone)]
pub struct CooldownLedger {
    interval_millis: i64,
    last_creation: HashMap<UserId, Timestamp>,
}

impl CooldownLedger {
    pub fn new(interval_millis: i64) -> Self {
        Self {
            interval_millis,
            last_creation: HashMap::new(),
        }
    }

    /// Accept and record an attempt unless the previous one is too recent.
    ///
    /// The slot is consumed on acceptance, whether or not creation later succeeds.
    pub fn try_acquire(&mut self, user: &UserId, now: Timestamp) -> bool {
        let interval = self.interval_millis;
        self.last_creation
            .retain(|_, last| now.value() - last.value() < interval);
        if self.last_creation.contains_key(user) {
            return false;
        }
        self.last_creation.insert(user.clone(), now);
        true
    }

    /// Users still inside their cooldown as of the last attempt.
    pub fn tracked_users(&self) -> usize {
        self.last_creation.len()
    }
}
