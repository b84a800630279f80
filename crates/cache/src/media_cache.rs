//! Media handle cache
//!
//! Maps a local resource path (relative to the files root) to the handle the
//! chat platform issued when the file was last uploaded.
//!
//! # Design
//!
//! - DashMap: sharded entries, lock-free reads from every handler thread
//! - hash lock: the read-entry / hash-file / write-entry decision is atomic, so
//!   two concurrent uploads of one path cannot both decide "needs update"
//! - write lock: snapshot flushes are serialized process-wide; a flush never
//!   holds the hash lock
//!
//! # Invalidation
//!
//! An entry is replaced only when the file is readable and its SHA-256 differs
//! from the stored hash. Entries are never deleted.

use crate::entry::{CacheEntry, Snapshot};
use crate::source::{FsReader, ResourceReader};
use crate::store::{JsonFileStore, SnapshotStore};
use dashmap::DashMap;
use funnelbot_core::{MediaRef, RemoteFile, Result};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Check if `path` is an `http(s)` URL rather than a local file
pub fn is_remote_url(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

/// Persistent local path → media handle cache
pub struct MediaCache {
    /// Caching active; when false every lookup sources the file directly
    enabled: bool,
    /// Directory local paths are resolved against
    root: PathBuf,
    /// Local path → cached handle
    entries: DashMap<String, CacheEntry>,
    reader: Arc<dyn ResourceReader>,
    store: Option<Arc<dyn SnapshotStore>>,
    /// Guards the update decision
    hash_lock: Mutex<()>,
    /// Serializes snapshot flushes
    write_lock: Mutex<()>,
}

impl MediaCache {
    /// Cache that never stores anything
    pub fn disabled(root: impl Into<PathBuf>) -> Self {
        MediaCache {
            enabled: false,
            root: root.into(),
            entries: DashMap::new(),
            reader: Arc::new(FsReader),
            store: None,
            hash_lock: Mutex::new(()),
            write_lock: Mutex::new(()),
        }
    }

    /// Cache persisted through `store`
    ///
    /// A store with nothing persisted yields an empty, enabled cache. A store
    /// that fails to load disables caching for the lifetime of this value.
    pub fn open(root: impl Into<PathBuf>, store: Arc<dyn SnapshotStore>) -> Self {
        let mut cache = Self::disabled(root);
        match store.load() {
            Ok(Some(snapshot)) => {
                debug!("Loaded {} media cache entries", snapshot.len());
                cache.entries.extend(snapshot);
                cache.enabled = true;
            }
            Ok(None) => cache.enabled = true,
            Err(e) => warn!("Failed to load media cache, caching disabled: {}", e),
        }
        cache.store = Some(store);
        cache
    }

    /// Cache persisted as JSON at `cache_path`, disabled when no path is given
    pub fn open_path(root: impl Into<PathBuf>, cache_path: Option<&Path>) -> Self {
        match cache_path {
            Some(path) => Self::open(root, Arc::new(JsonFileStore::new(path))),
            None => {
                info!("Media cache path is not set, caching disabled");
                Self::disabled(root)
            }
        }
    }

    /// Builder: read local files through `reader`
    pub fn with_reader(mut self, reader: Arc<dyn ResourceReader>) -> Self {
        self.reader = reader;
        self
    }

    /// Check if caching is active
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Directory local paths are resolved against
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached entry for `local_path`
    pub fn entry(&self, local_path: &str) -> Option<CacheEntry> {
        self.entries.get(local_path).map(|e| e.value().clone())
    }

    /// Full path of a local resource
    pub fn resolve(&self, local_path: &str) -> PathBuf {
        self.root.join(local_path)
    }

    /// Check if a local resource exists
    pub fn exists(&self, local_path: &str) -> bool {
        self.reader.exists(&self.resolve(local_path))
    }

    /// Media reference for `local_path`
    ///
    /// URLs are fetched by the platform. Local files are sent by cached handle
    /// when one exists, otherwise uploaded from disk.
    pub fn get(&self, local_path: &str) -> MediaRef {
        if is_remote_url(local_path) {
            return MediaRef::Url(local_path.to_string());
        }
        if self.enabled {
            if let Some(entry) = self.entries.get(local_path) {
                return MediaRef::Remote(entry.remote_file());
            }
        }
        MediaRef::Disk(self.resolve(local_path))
    }

    /// Media reference to send `local_path` with right now
    ///
    /// Like [`get`](Self::get), but a cached handle is only served while the
    /// file still matches its recorded hash. A changed file is uploaded again.
    pub fn source(&self, local_path: &str) -> MediaRef {
        if !is_remote_url(local_path) && self.is_need_update(local_path) {
            return MediaRef::Disk(self.resolve(local_path));
        }
        self.get(local_path)
    }

    /// Check if the entry for `local_path` would be replaced by [`actualize`](Self::actualize)
    pub fn is_need_update(&self, local_path: &str) -> bool {
        if !self.enabled {
            return false;
        }
        let _guard = self.hash_lock.lock();
        self.pending_hash(local_path).is_some()
    }

    /// Record `issued` for `local_path` if the file changed since the last record
    ///
    /// Returns `Ok(true)` when the entry was replaced and a snapshot written.
    /// An unreadable file is skipped without error.
    pub fn actualize(&self, local_path: &str, issued: &RemoteFile) -> Result<bool> {
        if !self.enabled {
            return Ok(false);
        }

        {
            let _guard = self.hash_lock.lock();
            let Some(hash) = self.pending_hash(local_path) else {
                return Ok(false);
            };
            self.entries
                .insert(local_path.to_string(), CacheEntry::new(issued, hash));
        }

        debug!("Media cache updated for {}", local_path);
        self.flush()?;
        Ok(true)
    }

    /// Persist every entry as one snapshot
    pub fn flush(&self) -> Result<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };

        let _guard = self.write_lock.lock();
        let snapshot: Snapshot = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        store.save(&snapshot)
    }

    /// Fresh hash of `local_path` when it differs from the stored one
    ///
    /// Caller must hold `hash_lock`.
    fn pending_hash(&self, local_path: &str) -> Option<String> {
        let hash = self.current_hash(local_path)?;
        let stored = self.entries.get(local_path).map(|e| e.hash.clone());
        if stored.as_deref() == Some(hash.as_str()) {
            None
        } else {
            Some(hash)
        }
    }

    fn current_hash(&self, local_path: &str) -> Option<String> {
        let path = self.resolve(local_path);
        if !self.reader.exists(&path) {
            return None;
        }
        match self.reader.read(&path) {
            Ok(bytes) => Some(crate::entry::content_hash(&bytes)),
            Err(e) => {
                debug!("Media cache: read {}: {}", path.display(), e);
                None
            }
        }
    }
}

impl std::fmt::Debug for MediaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaCache")
            .field("enabled", &self.enabled)
            .field("root", &self.root)
            .field("entries", &self.entries.len())
            .finish()
    }
}
