//! On-disk preview tier.
//!
//! A flat directory of JPEG files, one per cached preview, named by
//! [`CacheKey::file_name`]. There is no manifest: presence of a file is the
//! only membership record. The directory is created on the first write.
//!
//! Reads treat a missing, unreadable or corrupt file as a miss so the
//! resolver falls through to decoding the original. Writes go to a temporary
//! file that is renamed into place, so a concurrent reader never sees a
//! half-written JPEG.

use super::CacheKey;
use crate::imaging::RasterImage;
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use std::fs;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// JPEG quality used when none is configured.
const DEFAULT_QUALITY: u8 = 90;

#[derive(Error, Debug)]
pub enum CacheWriteError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to encode cache file: {0}")]
    Encode(#[from] image::ImageError),
}

/// Per-user default location: `<data_local_dir>/gallery/cache`.
pub fn default_cache_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("gallery").join("cache"))
}

/// Directory-backed preview cache.
#[derive(Debug)]
pub struct FileCache {
    dir: PathBuf,
    quality: u8,
    /// Disambiguates temp files written by concurrent `put`s.
    write_seq: AtomicU64,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_quality(dir, DEFAULT_QUALITY)
    }

    pub fn with_quality(dir: impl Into<PathBuf>, quality: u8) -> Self {
        Self {
            dir: dir.into(),
            quality: quality.clamp(1, 100),
            write_seq: AtomicU64::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Location of the cache file for `key` (which may not exist yet).
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Load the cached preview for `key`. Blocking I/O; call off the UI
    /// thread.
    pub fn get(&self, key: &CacheKey) -> Option<RasterImage> {
        let path = self.path_for(key);
        if !path.exists() {
            return None;
        }
        match image::open(&path) {
            Ok(img) => Some(RasterImage::from(img)),
            Err(err) => {
                tracing::warn!(
                    key = %key,
                    path = %path.display(),
                    error = %err,
                    "unreadable cache file, treating as miss"
                );
                None
            }
        }
    }

    /// Store `image` for `key` as JPEG.
    ///
    /// Alpha is dropped: previews are opaque photos.
    pub fn put(&self, key: &CacheKey, image: &RasterImage) -> Result<(), CacheWriteError> {
        fs::create_dir_all(&self.dir)?;

        let target = self.path_for(key);
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        let tmp = self
            .dir
            .join(format!(".{}.{}.{}.tmp", key.file_name(), std::process::id(), seq));

        let result = self.write_jpeg(&tmp, image);
        if let Err(err) = result {
            let _ = fs::remove_file(&tmp);
            return Err(err);
        }
        fs::rename(&tmp, &target).inspect_err(|_| {
            let _ = fs::remove_file(&tmp);
        })?;
        Ok(())
    }

    fn write_jpeg(&self, path: &Path, image: &RasterImage) -> Result<(), CacheWriteError> {
        let rgb = DynamicImage::ImageRgba8(image.to_rgba_image()).into_rgb8();
        let writer = BufWriter::new(fs::File::create(path)?);
        let encoder = JpegEncoder::new_with_quality(writer, self.quality);
        rgb.write_with_encoder(encoder)?;
        Ok(())
    }

    /// Number of cached previews on disk.
    pub fn len(&self) -> usize {
        fs::read_dir(&self.dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter(|e| {
                        e.path()
                            .extension()
                            .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg"))
                    })
                    .count()
            })
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
