//! Per-user command cooldowns
//!
//! The dispatch layer consults this gate before entering the engine; the
//! engine itself assumes cooldown was already checked. One entry per
//! (user, command) pair, dropped once it expires.

use grimoire_core::UserId;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Tracks when each user may next run each command
#[derive(Debug, Default)]
pub struct CooldownGate {
    deadlines: HashMap<(UserId, String), Instant>,
}

impl CooldownGate {
    /// Create an empty gate
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining whole seconds before `user` may run `command` again
    ///
    /// `None` means the invocation is admitted. Expired entries are removed
    /// on the way through.
    pub fn check(&mut self, user: &UserId, command: &str) -> Option<u64> {
        let key = (user.clone(), command.to_lowercase());
        let now = Instant::now();
        match self.deadlines.get(&key) {
            Some(deadline) if *deadline > now => {
                let remaining = deadline.duration_since(now);
                Some(remaining.as_secs_f64().ceil() as u64)
            }
            Some(_) => {
                self.deadlines.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Record an admitted invocation with the command's cooldown
    ///
    /// A zero cooldown clears any stale entry. Expired entries for other
    /// pairs are pruned while we are here.
    pub fn stamp(&mut self, user: &UserId, command: &str, cooldown_seconds: u64) {
        let now = Instant::now();
        self.deadlines.retain(|_, deadline| *deadline > now);
        let key = (user.clone(), command.to_lowercase());
        if cooldown_seconds == 0 {
            self.deadlines.remove(&key);
        } else {
            self.deadlines
                .insert(key, now + Duration::from_secs(cooldown_seconds));
        }
    }

    /// Number of live cooldown entries
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    /// Whether no cooldowns are active
    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}
