//! Long-lived player records.
//!
//! The `UserStore` keeps one [`User`] per player who has joined. It is
//! backed by a persistent `im::HashMap`, so taking a [`UserSnapshot`] for
//! the periodic save is O(1) on the main thread and the snapshot can be
//! written to disk from another thread while play continues.
//!
//! Every save goes through one [`SaveSlot`] per file. The slot serializes
//! writers and refuses a snapshot older than the one already on disk, so a
//! background save that finishes late cannot overwrite a newer save made at
//! shutdown.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use im::HashMap as ImHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::{EngineError, EntityId, Result, Timestamp};

/// One player's record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub name: String,
    pub online: bool,
    pub first_join: Timestamp,
    pub last_seen: Timestamp,
    /// Tier purchases made.
    pub purchases: u32,
}

impl User {
    #[must_use]
    pub fn new(id: EntityId, name: impl Into<String>, now: Timestamp) -> Self {
        Self {
            id,
            name: name.into(),
            online: false,
            first_join: now,
            last_seen: now,
            purchases: 0,
        }
    }
}

/// All known users.
#[derive(Clone, Debug, Default)]
pub struct UserStore {
    users: ImHashMap<EntityId, User>,
    // Bumped on every change; snapshots carry it.
    generation: u64,
}

impl UserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut User> {
        self.generation += 1;
        self.users.get_mut(&id)
    }

    /// Mark a player online, creating the record on first join.
    pub fn on_join(&mut self, id: EntityId, name: &str, now: Timestamp) -> &User {
        self.generation += 1;
        let user = self.users.entry(id).or_insert_with(|| {
            debug!(%id, name, "new user");
            User::new(id, name, now)
        });
        user.name = name.to_string();
        user.online = true;
        user.last_seen = now;
        user
    }

    /// Mark a player offline. Unknown players are ignored.
    pub fn on_quit(&mut self, id: EntityId, now: Timestamp) {
        self.generation += 1;
        if let Some(user) = self.users.get_mut(&id) {
            user.online = false;
            user.last_seen = now;
        }
    }

    pub fn record_purchase(&mut self, id: EntityId) {
        self.generation += 1;
        if let Some(user) = self.users.get_mut(&id) {
            user.purchases += 1;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn online(&self) -> impl Iterator<Item = &User> {
        self.users.values().filter(|u| u.online)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Freeze the current users for saving. O(1).
    #[must_use]
    pub fn snapshot(&self) -> UserSnapshot {
        UserSnapshot {
            users: self.users.clone(),
            generation: self.generation,
        }
    }

    /// Load users saved by [`UserSnapshot::write`]. A missing file is an
    /// empty store.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }
        let bytes = std::fs::read(path).map_err(|e| EngineError::io(path, e))?;
        let users: Vec<User> = bincode::deserialize(&bytes)?;
        info!(path = %path.display(), users = users.len(), "users loaded");
        Ok(Self {
            users: users.into_iter().map(|u| (u.id, u)).collect(),
            generation: 0,
        })
    }
}

/// A frozen copy of the user store.
#[derive(Clone, Debug)]
pub struct UserSnapshot {
    users: ImHashMap<EntityId, User>,
    generation: u64,
}

impl UserSnapshot {
    /// Change count of the store when the snapshot was taken.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Encode users in id order.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut users: Vec<&User> = self.users.values().collect();
        users.sort_by_key(|u| u.id);
        Ok(bincode::serialize(&users)?)
    }

    /// Write the snapshot, replacing the file atomically.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| EngineError::io(parent, e))?;
        }
        let bytes = self.encode()?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, bytes).map_err(|e| EngineError::io(&tmp, e))?;
        std::fs::rename(&tmp, path).map_err(|e| EngineError::io(path, e))?;
        debug!(path = %path.display(), users = self.len(), "users saved");
        Ok(())
    }
}

/// The single writer for one user data file.
///
/// Clones share the same lock and the same record of what was last written.
#[derive(Clone, Debug)]
pub struct SaveSlot {
    path: PathBuf,
    written: Arc<Mutex<Option<u64>>>,
}

impl SaveSlot {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            written: Arc::new(Mutex::new(None)),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `snapshot` unless a newer one is already on disk.
    ///
    /// Blocks while another write through this slot is in progress. Returns
    /// whether the file was written.
    pub fn write(&self, snapshot: &UserSnapshot) -> Result<bool> {
        let mut written = self.written.lock().unwrap_or_else(PoisonError::into_inner);
        if written.is_some_and(|w| snapshot.generation < w) {
            debug!(
                path = %self.path.display(),
                generation = snapshot.generation,
                "stale user snapshot skipped"
            );
            return Ok(false);
        }
        snapshot.write(&self.path)?;
        *written = Some(snapshot.generation);
        Ok(true)
    }
}
