//! Cache entry and snapshot types

use funnelbot_core::RemoteFile;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Cached media handle for one local path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Stable identifier of the file content
    #[serde(rename = "fileUniqueID")]
    pub unique_id: String,
    /// Identifier usable to resend the file
    #[serde(rename = "fileID")]
    pub file_id: String,
    /// Size in bytes
    pub size: u64,
    /// Content hash of the local file when the handle was issued
    pub hash: String,
}

impl CacheEntry {
    /// Entry for `issued`, computed from a file whose content hash is `hash`
    pub fn new(issued: &RemoteFile, hash: String) -> Self {
        CacheEntry {
            unique_id: issued.unique_id.clone(),
            file_id: issued.file_id.clone(),
            size: issued.size,
            hash,
        }
    }

    /// The platform handle this entry stands for
    pub fn remote_file(&self) -> RemoteFile {
        RemoteFile {
            file_id: self.file_id.clone(),
            unique_id: self.unique_id.clone(),
            size: self.size,
        }
    }
}

/// Whole-cache snapshot: local path → entry
///
/// Ordered so persisted snapshots are stable across writes.
pub type Snapshot = BTreeMap<String, CacheEntry>;

/// SHA-256 of `bytes`, lowercase hex
pub fn content_hash(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
