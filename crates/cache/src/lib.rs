//! Media cache for funnelbot
//!
//! This crate keeps a persistent mapping from local resource paths to the
//! media handles the chat platform issued for them, so unchanged files are
//! sent by reference instead of being uploaded again:
//! - MediaCache: DashMap-backed entries with hash-based invalidation
//! - ResourceReader: file existence / content access (FsReader default)
//! - SnapshotStore: whole-cache persistence (JsonFileStore default)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entry;
pub mod media_cache;
pub mod source;
pub mod store;

pub use entry::{content_hash, CacheEntry, Snapshot};
pub use media_cache::{is_remote_url, MediaCache};
pub use source::{FsReader, ResourceReader};
pub use store::{JsonFileStore, SnapshotStore};
