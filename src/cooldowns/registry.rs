//! Per-actor last-use timestamps.

use std::time::Duration;

use rustc_hash::FxHashMap;

use crate::core::{EntityId, Timestamp};

/// Timestamp store keyed by actor.
///
/// Entries are created on the first successful use and overwritten on each
/// later one. They are never removed; the map is bounded by the number of
/// distinct actors seen.
///
/// ## Example
///
/// ```
/// use std::time::Duration;
/// use enchant_engine::cooldowns::CooldownRegistry;
/// use enchant_engine::core::{EntityId, Timestamp};
///
/// let mut cooldowns = CooldownRegistry::new();
/// let cooldown = Duration::from_secs(5);
///
/// cooldowns.apply_cooldown(EntityId(1), Timestamp(0));
/// assert!(cooldowns.is_on_cooldown(EntityId(1), cooldown, Timestamp(4_999)));
/// assert!(!cooldowns.is_on_cooldown(EntityId(1), cooldown, Timestamp(5_000)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct CooldownRegistry {
    last_use: FxHashMap<EntityId, Timestamp>,
}

impl CooldownRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `actor` used the gated action less than `cooldown` ago.
    #[must_use]
    pub fn is_on_cooldown(&self, actor: EntityId, cooldown: Duration, now: Timestamp) -> bool {
        !self.remaining_time(actor, cooldown, now).is_zero()
    }

    /// Time left before `actor` may use the action again; zero when free.
    #[must_use]
    pub fn remaining_time(&self, actor: EntityId, cooldown: Duration, now: Timestamp) -> Duration {
        self.last_use
            .get(&actor)
            .map_or(Duration::ZERO, |&last| cooldown.saturating_sub(now.since(last)))
    }

    /// Record a successful use at `now`.
    pub fn apply_cooldown(&mut self, actor: EntityId, now: Timestamp) {
        self.last_use.insert(actor, now);
    }

    /// When `actor` last used the action.
    #[must_use]
    pub fn last_use(&self, actor: EntityId) -> Option<Timestamp> {
        self.last_use.get(&actor).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.last_use.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.last_use.is_empty()
    }
}
