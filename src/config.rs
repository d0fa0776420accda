//! Gallery configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! overridden by a user file in the per-user config directory
//! (`<config_dir>/gallery/config.toml`) or the directory passed with
//! `--config`.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [cache]
//! preview_capacity = 100   # Grid thumbnails kept in memory
//! full_capacity = 30       # Full-size viewer images kept in memory
//! preview_edge = 384       # Longer edge of a grid thumbnail, in pixels
//! jpeg_quality = 90        # Quality of thumbnails written to disk (1-100)
//! disk = true              # Persist thumbnails across restarts
//! # directory = "/path"    # Override the thumbnail directory
//!
//! [grid]
//! cell_size = 192.0        # Minimum cell width in pixels
//! scroll_commit_ms = 100   # Quiet period before a scrollbar drag scrolls the list
//! scrollbar_handle = 48.0  # Height of the scrollbar handle in pixels
//!
//! [viewer]
//! key_repeat_ms = 200      # Quiet period before arrow keys switch photos
//!
//! [scan]
//! timestamp = "created"    # "created" or "modified"
//!
//! [processing]
//! max_processes = 4        # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Gallery configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Memory and disk cache settings.
    pub cache: CacheConfig,
    /// Grid layout and scrollbar behaviour.
    pub grid: GridConfig,
    /// Photo viewer behaviour.
    pub viewer: ViewerConfig,
    /// Date-view scanning.
    pub scan: ScanConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.preview_capacity == 0 || self.cache.full_capacity == 0 {
            return Err(ConfigError::Validation(
                "cache capacities must be at least 1".into(),
            ));
        }
        if self.cache.preview_edge == 0 {
            return Err(ConfigError::Validation(
                "cache.preview_edge must be non-zero".into(),
            ));
        }
        if !(1..=100).contains(&self.cache.jpeg_quality) {
            return Err(ConfigError::Validation(
                "cache.jpeg_quality must be 1-100".into(),
            ));
        }
        if !(self.grid.cell_size > 0.0) {
            return Err(ConfigError::Validation(
                "grid.cell_size must be positive".into(),
            ));
        }
        if !(self.grid.scrollbar_handle >= 0.0) {
            return Err(ConfigError::Validation(
                "grid.scrollbar_handle must not be negative".into(),
            ));
        }
        Ok(())
    }
}

/// Memory and disk cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Entries in the grid-thumbnail memory tier.
    pub preview_capacity: usize,
    /// Entries in the full-size memory tier.
    pub full_capacity: usize,
    /// Longer edge of generated thumbnails, in pixels.
    pub preview_edge: u32,
    /// JPEG quality of thumbnails written to disk.
    pub jpeg_quality: u8,
    /// Whether thumbnails are persisted to disk at all.
    pub disk: bool,
    /// Thumbnail directory. When absent, the per-user data directory is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            preview_capacity: crate::cache::PREVIEW_CAPACITY,
            full_capacity: crate::cache::FULL_CAPACITY,
            preview_edge: 384,
            jpeg_quality: 90,
            disk: true,
            directory: None,
        }
    }
}

impl CacheConfig {
    /// Directory for the disk tier, or `None` when disabled or no per-user
    /// data directory can be determined.
    pub fn disk_dir(&self) -> Option<PathBuf> {
        if !self.disk {
            return None;
        }
        self.directory
            .clone()
            .or_else(crate::cache::default_cache_dir)
    }
}

/// Grid layout and scrollbar behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Minimum width of one grid cell; the column count is
    /// `floor(viewport_width / cell_size)`.
    pub cell_size: f32,
    /// Quiet period after the last scrollbar movement before the list scrolls.
    pub scroll_commit_ms: u64,
    /// Height of the draggable scrollbar handle.
    pub scrollbar_handle: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: 192.0,
            scroll_commit_ms: 100,
            scrollbar_handle: 48.0,
        }
    }
}

impl GridConfig {
    pub fn scroll_commit_delay(&self) -> Duration {
        Duration::from_millis(self.scroll_commit_ms)
    }
}

/// Photo viewer behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// Quiet period after the last arrow key before the viewer switches photo.
    pub key_repeat_ms: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self { key_repeat_ms: 200 }
    }
}

impl ViewerConfig {
    pub fn key_repeat_delay(&self) -> Duration {
        Duration::from_millis(self.key_repeat_ms)
    }
}

/// Which filesystem timestamp orders the date view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampSource {
    /// File creation (birth) time, falling back to modification time where
    /// the platform does not record it.
    #[default]
    Created,
    /// Last modification time.
    Modified,
}

/// Date-view scanning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    pub timestamp: TimestampSource,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel I/O and decode workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Per-user config directory: `<config_dir>/gallery`.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("gallery"))
}

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(GalleryConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<GalleryConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in `dir`, on top of stock defaults.
pub fn load_config(dir: &Path) -> Result<GalleryConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(dir)?)
}

/// Load from `dir` when given, else from the per-user config directory,
/// else stock defaults.
pub fn load_config_or_default(dir: Option<&Path>) -> Result<GalleryConfig, ConfigError> {
    match dir.map(Path::to_path_buf).or_else(default_config_dir) {
        Some(dir) => load_config(&dir),
        None => Ok(GalleryConfig::default()),
    }
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Gallery Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Image cache
# ---------------------------------------------------------------------------
[cache]
# Grid thumbnails kept in memory. Oldest-inserted entries are evicted first.
preview_capacity = 100

# Full-size viewer images kept in memory.
full_capacity = 30

# Longer edge of a grid thumbnail, in pixels (2x the default cell size).
preview_edge = 384

# JPEG quality of thumbnails written to the disk cache (1-100).
jpeg_quality = 90

# Persist thumbnails across restarts.
disk = true

# Thumbnail directory. Defaults to the per-user data directory.
# directory = "/home/me/.local/share/gallery/cache"

# ---------------------------------------------------------------------------
# Grid and scrollbar
# ---------------------------------------------------------------------------
[grid]
# Minimum cell width in pixels. Columns = floor(window width / cell_size).
cell_size = 192.0

# Quiet period (ms) after the last scrollbar movement before the list scrolls.
scroll_commit_ms = 100

# Height of the scrollbar handle in pixels.
scrollbar_handle = 48.0

# ---------------------------------------------------------------------------
# Photo viewer
# ---------------------------------------------------------------------------
[viewer]
# Quiet period (ms) after the last arrow key before switching photos.
key_repeat_ms = 200

# ---------------------------------------------------------------------------
# Date view
# ---------------------------------------------------------------------------
[scan]
# Timestamp used to sort and group photos by month: "created" or "modified".
# "created" falls back to "modified" where the filesystem has no birth time.
timestamp = "created"

# ---------------------------------------------------------------------------
# Parallel processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers. Omit for auto (= number of CPU cores).
# max_processes = 4
"##
}
