//! Storage seam for bandit learning state.
//!
//! The core never chooses a backend. Callers pass any [`SnapshotStore`]:
//! - [`MemorySnapshotStore`]: in-process map, for tests and short-lived runs
//! - [`FileSnapshotStore`]: one JSON file per role id in a directory
//!
//! A missing snapshot is `Ok(None)`, not an error.

use rustc_hash::FxHashMap;

use crate::engine::bandit::GraphBandit;
use crate::engine::errors::RankError;
use crate::engine::snapshot::{restore_state, BanditRecord};

#[cfg(feature = "serde")]
use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use crate::engine::snapshot::{load_snapshot_json, save_snapshot_json, Snapshot};

/// Keyed persistence for bandit records.
pub trait SnapshotStore {
    fn save(&mut self, role_id: &str, record: &BanditRecord) -> Result<(), RankError>;

    /// The record for `role_id`, or `None` if nothing was saved.
    fn load(&self, role_id: &str) -> Result<Option<BanditRecord>, RankError>;
}

/// Restores `bandit` from `store` if a record exists for `role_id`.
///
/// Returns `false` (bandit untouched) when no snapshot is available.
pub fn restore_from_store<S: SnapshotStore + ?Sized>(
    bandit: &mut GraphBandit,
    store: &S,
    role_id: &str,
) -> Result<bool, RankError> {
    match store.load(role_id)? {
        Some(record) => {
            restore_state(bandit, record)?;
            Ok(true)
        }
        None => {
            #[cfg(feature = "tracing")]
            tracing::debug!(role_id, "no snapshot available");
            Ok(false)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    records: FxHashMap<String, BanditRecord>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn save(&mut self, role_id: &str, record: &BanditRecord) -> Result<(), RankError> {
        self.records.insert(role_id.to_string(), record.clone());
        Ok(())
    }

    fn load(&self, role_id: &str) -> Result<Option<BanditRecord>, RankError> {
        Ok(self.records.get(role_id).cloned())
    }
}

/// Stores each role's snapshot as `<dir>/<escaped role id>.json`.
///
/// Each file records the role id it was saved under; `load` ignores a file
/// written for a different role.
#[cfg(feature = "serde")]
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

#[cfg(feature = "serde")]
impl FileSnapshotStore {
    /// Store rooted at `dir`, created on first save if missing.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, role_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_file_stem(role_id)))
    }
}

#[cfg(feature = "serde")]
impl SnapshotStore for FileSnapshotStore {
    fn save(&mut self, role_id: &str, record: &BanditRecord) -> Result<(), RankError> {
        std::fs::create_dir_all(&self.dir)?;
        let snapshot = Snapshot::new(record.clone(), Some(role_id.to_string()));
        let json = save_snapshot_json(&snapshot)?;
        std::fs::write(self.path_for(role_id), json)?;
        Ok(())
    }

    fn load(&self, role_id: &str) -> Result<Option<BanditRecord>, RankError> {
        let path = self.path_for(role_id);
        let json = match std::fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let snapshot = load_snapshot_json(&json)?;
        match snapshot.metadata.role_id.as_deref() {
            Some(stored) if stored != role_id => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    requested = role_id,
                    stored,
                    path = %path.display(),
                    "snapshot belongs to another role, ignoring"
                );
                Ok(None)
            }
            _ => Ok(Some(snapshot.record)),
        }
    }
}

/// Maps a role id to a safe, unique file stem.
///
/// ASCII alphanumerics and `-` are kept. Every other byte, `_` included,
/// becomes `_` followed by two uppercase hex digits, so distinct ids never
/// share a stem. An empty id maps to `_`.
pub fn sanitize_file_stem(role_id: &str) -> String {
    if role_id.is_empty() {
        return "_".to_string();
    }
    let mut stem = String::with_capacity(role_id.len());
    for byte in role_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            stem.push(byte as char);
        } else {
            stem.push_str(&format!("_{:02X}", byte));
        }
    }
    stem
}
