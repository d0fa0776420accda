//! Two-tier image cache: bounded in-memory tiers plus an on-disk thumbnail
//! directory.
//!
//! # Tiers
//!
//! | Tier | Type | Holds | Bound |
//! |---|---|---|---|
//! | Preview (memory) | [`MemoryCache`] | grid thumbnails | 100 entries |
//! | Full (memory) | [`MemoryCache`] | viewer images | 30 entries |
//! | Disk | [`FileCache`] | preview thumbnails as JPEG | unbounded |
//!
//! The tiers are independent: there is no cross-tier atomicity, and a disk
//! write racing a memory eviction is harmless.
//!
//! ## Cache keys
//!
//! A [`CacheKey`] is the lexically absolute path of the source file. The size class is
//! implicit in which tier the key is used with. There is no invalidation on
//! file modification: a thumbnail cached for a path is served until evicted
//! (memory) or deleted by hand (disk).

mod file;
mod memory;

pub use file::{CacheWriteError, FileCache, default_cache_dir};
pub use memory::{FULL_CAPACITY, MemoryCache, PREVIEW_CAPACITY};

use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Which resolution a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeClass {
    /// Grid thumbnail, bounded by `cache.preview_edge`.
    Preview,
    /// Full-resolution viewer image.
    Full,
}

/// Cache key derived from the absolute source path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build the key for `path`: its absolute form, made lexically.
    ///
    /// Never reads the filesystem (symlinks are not resolved), so it is safe
    /// on the UI thread. Relative paths are joined to the working directory.
    pub fn for_path(path: &Path) -> Self {
        let absolute: PathBuf = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        Self(absolute.to_string_lossy().into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Filesystem-safe name of the disk-cache file for this key:
    /// SHA-256 of the key as hex, with a `.jpg` extension.
    pub fn file_name(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        format!("{:x}.jpg", digest)
    }
}

impl From<&str> for CacheKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lock-free counters updated by concurrent resolutions.
#[derive(Debug, Default)]
pub(crate) struct CacheCounters {
    memory_hits: AtomicU64,
    disk_hits: AtomicU64,
    decodes: AtomicU64,
    failures: AtomicU64,
}

impl CacheCounters {
    pub(crate) fn memory_hit(&self) {
        self.memory_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn disk_hit(&self) {
        self.disk_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn decode(&self) {
        self.decodes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CacheStats {
        CacheStats {
            memory_hits: self.memory_hits.load(Ordering::Relaxed),
            disk_hits: self.disk_hits.load(Ordering::Relaxed),
            decodes: self.decodes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

/// Summary of cache performance since the resolver was created.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub memory_hits: u64,
    pub disk_hits: u64,
    pub decodes: u64,
    pub failures: u64,
}

impl CacheStats {
    pub fn total(&self) -> u64 {
        self.memory_hits + self.disk_hits + self.decodes
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.memory_hits > 0 || self.disk_hits > 0 {
            write!(
                f,
                "{} in memory, {} from disk, {} decoded ({} total)",
                self.memory_hits,
                self.disk_hits,
                self.decodes,
                self.total()
            )?;
        } else {
            write!(f, "{} decoded", self.decodes)?;
        }
        if self.failures > 0 {
            write!(f, ", {} failed", self.failures)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn key_drops_current_dir_components() {
        let direct = CacheKey::for_path(Path::new("/photos/a.jpg"));
        let dotted = CacheKey::for_path(Path::new("/photos/./a.jpg"));
        assert_eq!(direct, dotted);
        assert_eq!(direct.as_str(), "/photos/a.jpg");
    }

    #[cfg(unix)]
    #[test]
    fn key_does_not_resolve_symlinks() {
        let tmp = TempDir::new().unwrap();
        let real = tmp.path().join("real");
        std::fs::create_dir(&real).unwrap();
        std::fs::write(real.join("a.jpg"), b"x").unwrap();
        let link = tmp.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let key = CacheKey::for_path(&link.join("a.jpg"));
        assert_eq!(key.as_str(), link.join("a.jpg").to_string_lossy());
        assert_ne!(key, CacheKey::for_path(&real.join("a.jpg")));
    }

    #[test]
    fn key_for_missing_file_is_absolute() {
        let key = CacheKey::for_path(Path::new("does/not/exist.jpg"));
        assert!(Path::new(key.as_str()).is_absolute());
    }

    #[test]
    fn file_name_is_stable_hex() {
        let key = CacheKey::from("/photos/a.jpg");
        let name = key.file_name();
        assert_eq!(name, CacheKey::from("/photos/a.jpg").file_name());
        assert_eq!(name.len(), 64 + ".jpg".len());
        assert!(name.ends_with(".jpg"));
        assert_ne!(name, CacheKey::from("/photos/b.jpg").file_name());
    }

    #[test]
    fn stats_display_with_hits() {
        let stats = CacheStats {
            memory_hits: 5,
            disk_hits: 2,
            decodes: 1,
            failures: 0,
        };
        assert_eq!(format!("{}", stats), "5 in memory, 2 from disk, 1 decoded (8 total)");
    }

    #[test]
    fn stats_display_no_hits_with_failures() {
        let stats = CacheStats {
            decodes: 3,
            failures: 1,
            ..CacheStats::default()
        };
        assert_eq!(format!("{}", stats), "3 decoded, 1 failed");
    }

    #[test]
    fn counters_snapshot() {
        let counters = CacheCounters::default();
        counters.memory_hit();
        counters.disk_hit();
        counters.disk_hit();
        counters.decode();
        let stats = counters.snapshot();
        assert_eq!(stats.memory_hits, 1);
        assert_eq!(stats.disk_hits, 2);
        assert_eq!(stats.decodes, 1);
    }
}
