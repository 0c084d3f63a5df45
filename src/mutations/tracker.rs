//! Temporary block mutation tracking.
//!
//! Effects such as `REPLACE_NEAR` and `COAT` change blocks for a while and
//! must put them back. The tracker remembers, per position, the state the
//! block had before the first mutation and when it should be restored.
//!
//! ## Invariants
//!
//! - At most one record per position.
//! - The recorded original is captured once. Mutating an already-mutated
//!   position keeps the first original and only refreshes the revert time,
//!   so restoration never "restores" an intermediate mutated state.
//! - Every record is reverted eventually: by [`MutationTracker::sweep`] once
//!   its time has come, or by [`MutationTracker::flush`] at shutdown.
//!
//! All methods take `&mut self`; the owning engine lives on the host's main
//! thread, which makes it the single writer for every position.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::core::{BlockPos, BlockState, Timestamp, World};

/// Bookkeeping for one altered position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationRecord {
    /// State before the first mutation.
    pub original: BlockState,
    /// When to restore. `None` means "only at shutdown".
    pub revert_at: Option<Timestamp>,
}

impl MutationRecord {
    /// Whether the record should be reverted at `now`.
    #[must_use]
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.revert_at.is_some_and(|at| at <= now)
    }
}

/// Registry of positions currently altered by effects.
#[derive(Debug, Default)]
pub struct MutationTracker {
    records: FxHashMap<BlockPos, MutationRecord>,
}

impl MutationTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `pos` was changed away from `original`.
    ///
    /// If `pos` already has a pending record its original is kept and only
    /// the revert time is replaced. Returns `true` if a new record was
    /// created.
    pub fn register(&mut self, pos: BlockPos, original: BlockState, revert_at: Option<Timestamp>) -> bool {
        match self.records.get_mut(&pos) {
            Some(record) => {
                record.revert_at = revert_at;
                debug!(%pos, ?revert_at, "refreshed mutation record");
                false
            }
            None => {
                debug!(%pos, original = %original.material, ?revert_at, "registered mutation record");
                self.records.insert(pos, MutationRecord { original, revert_at });
                true
            }
        }
    }

    /// Replace the block at `pos` and register the change.
    ///
    /// The current block is captured as the original only when the position
    /// is not already tracked.
    pub fn mutate(
        &mut self,
        world: &mut dyn World,
        pos: BlockPos,
        replacement: BlockState,
        revert_at: Option<Timestamp>,
    ) -> bool {
        let original = self
            .records
            .get(&pos)
            .map_or_else(|| world.block(pos), |r| r.original.clone());
        let created = self.register(pos, original, revert_at);
        world.set_block(pos, replacement);
        created
    }

    /// The pending record at a position.
    #[must_use]
    pub fn get(&self, pos: BlockPos) -> Option<&MutationRecord> {
        self.records.get(&pos)
    }

    /// The pre-mutation state of a tracked position.
    #[must_use]
    pub fn original(&self, pos: BlockPos) -> Option<&BlockState> {
        self.records.get(&pos).map(|r| &r.original)
    }

    #[must_use]
    pub fn is_mutated(&self, pos: BlockPos) -> bool {
        self.records.contains_key(&pos)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate pending records.
    pub fn iter(&self) -> impl Iterator<Item = (&BlockPos, &MutationRecord)> {
        self.records.iter()
    }

    /// Restore one position now, whatever its revert time.
    pub fn revert(&mut self, world: &mut dyn World, pos: BlockPos) -> bool {
        match self.records.remove(&pos) {
            Some(record) => {
                world.set_block(pos, record.original);
                debug!(%pos, "reverted mutation");
                true
            }
            None => false,
        }
    }

    /// Restore every record whose revert time has passed.
    ///
    /// Returns how many positions were restored.
    pub fn sweep(&mut self, world: &mut dyn World, now: Timestamp) -> usize {
        let mut due: Vec<BlockPos> = self
            .records
            .iter()
            .filter(|(_, r)| r.is_due(now))
            .map(|(&pos, _)| pos)
            .collect();
        due.sort_unstable();

        for &pos in &due {
            self.revert(world, pos);
        }
        if !due.is_empty() {
            debug!(reverted = due.len(), pending = self.records.len(), "mutation sweep");
        }
        due.len()
    }

    /// Restore every pending record, due or not.
    ///
    /// This is the shutdown path; afterwards the tracker is empty.
    pub fn flush(&mut self, world: &mut dyn World) -> usize {
        let mut all: Vec<(BlockPos, MutationRecord)> = self.records.drain().collect();
        all.sort_unstable_by_key(|(pos, _)| *pos);

        let count = all.len();
        for (pos, record) in all {
            world.set_block(pos, record.original);
        }
        info!(reverted = count, "flushed temporary block mutations");
        count
    }
}

impl Drop for MutationTracker {
    fn drop(&mut self) {
        if !self.records.is_empty() {
            error!(
                pending = self.records.len(),
                "mutation tracker dropped with unreverted blocks; world state is now altered"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimWorld;

    fn stone() -> BlockState {
        BlockState::new("STONE")
    }

    #[test]
    fn test_register_keeps_first_original() {
        let mut tracker = MutationTracker::new();
        let pos = BlockPos::new(0, 64, 0);

        assert!(tracker.register(pos, stone(), Some(Timestamp(100))));
        assert!(!tracker.register(pos, BlockState::new("ICE"), Some(Timestamp(500))));

        let record = tracker.get(pos).unwrap();
        assert_eq!(record.original, stone());
        assert_eq!(record.revert_at, Some(Timestamp(500)));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_mutate_twice_restores_pre_first_state() {
        let mut world = SimWorld::new();
        let pos = BlockPos::new(1, 60, 1);
        world.set_block(pos, BlockState::new("WATER"));

        let mut tracker = MutationTracker::new();
        tracker.mutate(&mut world, pos, BlockState::new("ICE"), Some(Timestamp(1_000)));
        tracker.mutate(&mut world, pos, BlockState::new("PACKED_ICE"), Some(Timestamp(2_000)));

        assert_eq!(tracker.original(pos), Some(&BlockState::new("WATER")));
        assert_eq!(world.block(pos), BlockState::new("PACKED_ICE"));

        tracker.flush(&mut world);
        assert_eq!(world.block(pos), BlockState::new("WATER"));
    }

    #[test]
    fn test_sweep_only_due() {
        let mut world = SimWorld::new();
        let mut tracker = MutationTracker::new();
        let early = BlockPos::new(0, 0, 0);
        let late = BlockPos::new(5, 0, 0);
        let forever = BlockPos::new(9, 0, 0);

        tracker.mutate(&mut world, early, stone(), Some(Timestamp(100)));
        tracker.mutate(&mut world, late, stone(), Some(Timestamp(1_000)));
        tracker.mutate(&mut world, forever, stone(), None);

        assert_eq!(tracker.sweep(&mut world, Timestamp(99)), 0);
        assert_eq!(tracker.sweep(&mut world, Timestamp(100)), 1);
        assert!(world.block(early).material.is_air());
        assert_eq!(world.block(late), stone());
        assert_eq!(tracker.sweep(&mut world, Timestamp(u64::MAX)), 1);
        assert!(tracker.is_mutated(forever));

        assert_eq!(tracker.flush(&mut world), 1);
        assert!(tracker.is_empty());
        assert!(world.block(forever).material.is_air());
    }

    #[test]
    fn test_revert_single() {
        let mut world = SimWorld::new();
        let mut tracker = MutationTracker::new();
        let pos = BlockPos::new(3, 3, 3);

        tracker.mutate(&mut world, pos, stone(), None);
        assert!(tracker.revert(&mut world, pos));
        assert!(!tracker.revert(&mut world, pos));
        assert!(world.block(pos).material.is_air());
    }
}
