//! Last-used root directory and view mode, persisted between runs.
//!
//! Stored as `settings.json` in the per-user data directory:
//!
//! ```json
//! {
//!   "directory": "/home/me/Pictures",
//!   "gallery_view_type": "ALL"
//! }
//! ```
//!
//! A missing or empty file reads as defaults. Every setter writes the file
//! straight away.

use crate::types::GalleryViewType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid settings file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No per-user data directory on this platform")]
    NoDataDir,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsData {
    pub directory: Option<PathBuf>,
    pub gallery_view_type: GalleryViewType,
}

/// `<data_local_dir>/gallery/settings.json`
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("gallery").join("settings.json"))
}

#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    data: SettingsData,
}

impl SettingsStore {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => SettingsData::default(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => SettingsData::default(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, data })
    }

    pub fn load_default() -> Result<Self, SettingsError> {
        Self::load(default_settings_path().ok_or(SettingsError::NoDataDir)?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> &SettingsData {
        &self.data
    }

    pub fn directory(&self) -> Option<&Path> {
        self.data.directory.as_deref()
    }

    pub fn view_type(&self) -> GalleryViewType {
        self.data.gallery_view_type
    }

    /// Remember `dir` (stored as an absolute path) or forget it with `None`.
    pub fn set_directory(&mut self, dir: Option<&Path>) -> Result<(), SettingsError> {
        self.data.directory = match dir {
            Some(dir) => Some(std::path::absolute(dir)?),
            None => None,
        };
        self.save()
    }

    pub fn set_view_type(&mut self, view_type: GalleryViewType) -> Result<(), SettingsError> {
        self.data.gallery_view_type = view_type;
        self.save()
    }

    fn save(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.data)?)?;
        tracing::debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}
