//! Snapshot persistence

use crate::entry::Snapshot;
use funnelbot_core::{Error, Result};
use std::path::{Path, PathBuf};

/// Whole-cache persistence
pub trait SnapshotStore: Send + Sync {
    /// Load the persisted snapshot; `Ok(None)` when nothing was persisted yet
    fn load(&self) -> Result<Option<Snapshot>>;

    /// Replace the persisted snapshot
    fn save(&self, snapshot: &Snapshot) -> Result<()>;
}

/// [`SnapshotStore`] writing pretty-printed JSON to one file
///
/// Saves go through a sibling temporary file and a rename, so a crash never
/// leaves a half-written snapshot behind.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    /// Snapshot file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path)?;
        let snapshot: Snapshot = serde_json::from_str(&raw)?;
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let json = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.temp_path();
        std::fs::write(&tmp, json)
            .and_then(|_| std::fs::rename(&tmp, &self.path))
            .map_err(|e| Error::external("cache snapshot write", format!("{}: {}", self.path.display(), e)))
    }
}
