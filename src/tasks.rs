//! Scheduled background tasks.
//!
//! The mutation sweep and the user-data save run on timers, but both touch
//! state owned by the host's main thread. The timers therefore only send an
//! [`EngineTask`] over a channel; the host drains the channel on its main
//! thread and hands each task to the engine. Only the final disk write of a
//! save runs off-thread, on a snapshot that nothing else can change.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error};

use crate::core::{ticks_to_duration, EngineConfig, Result};
use crate::users::{SaveSlot, UserSnapshot};

/// Longest timer period. Longer intervals are clamped to it.
pub const MAX_TIMER_PERIOD: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Work a timer asks the main thread to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EngineTask {
    /// Revert mutations whose time has come.
    SweepMutations,
    /// Snapshot user data and write it out.
    SaveUsers,
}

/// Running task timers.
///
/// Dropping the scheduler stops the timers.
#[derive(Debug)]
pub struct TaskScheduler {
    timers: Vec<JoinHandle<()>>,
}

impl TaskScheduler {
    /// Start the sweep and save timers on the current tokio runtime.
    ///
    /// Intervals come from `sweep_interval` and `save_interval` (ticks). A
    /// zero interval disables that timer and intervals beyond
    /// [`MAX_TIMER_PERIOD`] are clamped. The first message of each timer
    /// arrives one full interval after start.
    pub fn start(config: &EngineConfig) -> (Self, mpsc::UnboundedReceiver<EngineTask>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let timers = [
            (EngineTask::SweepMutations, config.sweep_interval),
            (EngineTask::SaveUsers, config.save_interval),
        ]
        .into_iter()
        .filter(|&(_, ticks)| ticks > 0)
        .map(|(task, ticks)| spawn_timer(task, ticks_to_duration(ticks).min(MAX_TIMER_PERIOD), tx.clone()))
        .collect();
        (Self { timers }, rx)
    }

    /// Number of running timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Stop every timer.
    pub fn stop(&mut self) {
        for timer in self.timers.drain(..) {
            timer.abort();
        }
    }
}

impl Drop for TaskScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn spawn_timer(task: EngineTask, period: Duration, tx: mpsc::UnboundedSender<EngineTask>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if tx.send(task).is_err() {
                debug!(?task, "task receiver closed, timer stopping");
                break;
            }
        }
    })
}

/// Write a user snapshot through `slot` on the blocking pool.
///
/// The handle resolves to whether the snapshot was written; a newer save
/// that got there first wins.
pub fn save_in_background(snapshot: UserSnapshot, slot: SaveSlot) -> JoinHandle<Result<bool>> {
    tokio::task::spawn_blocking(move || {
        let result = slot.write(&snapshot);
        if let Err(e) = &result {
            error!(path = %slot.path().display(), error = %e, "user data save failed");
        }
        result
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EntityId, Timestamp};
    use crate::users::UserStore;

    #[tokio::test(start_paused = true)]
    async fn test_timers_send_tasks() {
        let config = EngineConfig {
            sweep_interval: 20,
            save_interval: 110,
            ..EngineConfig::default()
        };
        let (scheduler, mut rx) = TaskScheduler::start(&config);
        assert_eq!(scheduler.len(), 2);

        // Sweeps every second, the save at 5.5 s.
        let mut received = Vec::new();
        for _ in 0..6 {
            received.push(rx.recv().await.unwrap());
        }
        assert_eq!(&received[..5], &[EngineTask::SweepMutations; 5]);
        assert_eq!(received[5], EngineTask::SaveUsers);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_disables_timer() {
        let config = EngineConfig {
            sweep_interval: 0,
            save_interval: 20,
            ..EngineConfig::default()
        };
        let (scheduler, mut rx) = TaskScheduler::start(&config);
        assert_eq!(scheduler.len(), 1);
        assert_eq!(rx.recv().await, Some(EngineTask::SaveUsers));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_closes_channel() {
        let (mut scheduler, mut rx) = TaskScheduler::start(&EngineConfig::default());
        scheduler.stop();
        assert!(scheduler.is_empty());
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_save_in_background() {
        let dir = tempfile::tempdir().unwrap();
        let slot = SaveSlot::new(dir.path().join("users.bin"));

        let mut users = UserStore::new();
        users.on_join(EntityId(4), "Robin", Timestamp(0));
        assert!(save_in_background(users.snapshot(), slot.clone()).await.unwrap().unwrap());

        assert_eq!(UserStore::load(slot.path()).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_late_background_save_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let slot = SaveSlot::new(dir.path().join("users.bin"));

        let mut users = UserStore::new();
        users.on_join(EntityId(1), "Alex", Timestamp(0));
        let early = users.snapshot();
        users.on_join(EntityId(2), "Sam", Timestamp(1));
        assert!(slot.write(&users.snapshot()).unwrap());

        assert!(!save_in_background(early, slot.clone()).await.unwrap().unwrap());
        assert_eq!(UserStore::load(slot.path()).unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_interval_is_clamped() {
        let config = EngineConfig {
            sweep_interval: u64::MAX / 100,
            save_interval: u64::MAX,
            ..EngineConfig::default()
        };
        let (scheduler, mut rx) = TaskScheduler::start(&config);
        assert_eq!(scheduler.len(), 2);

        time::advance(Duration::from_secs(60)).await;
        assert!(rx.try_recv().is_err());
    }
}
