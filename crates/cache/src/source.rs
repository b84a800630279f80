//! Access to local media files

use std::io;
use std::path::Path;

/// File existence and content access
///
/// Abstracted so the cache can be exercised without touching the disk.
pub trait ResourceReader: Send + Sync {
    /// Check if `path` names a readable regular file
    fn exists(&self, path: &Path) -> bool;

    /// Read the full content of `path`
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// [`ResourceReader`] backed by the local file system
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl ResourceReader for FsReader {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}
