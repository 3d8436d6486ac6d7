//! Loads and saves [`AppSettings`] as pretty-printed JSON.

use anyhow::{Context, Result};
use shared::settings::AppSettings;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    /// Store under the platform config directory, if one can be determined.
    pub fn new() -> Option<Self> {
        let proj = directories::ProjectDirs::from("com.local", "File Organizer", "FileOrganizer")?;
        Some(Self::at_path(proj.config_dir().join(SETTINGS_FILE)))
    }

    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns defaults when the file is missing or unreadable.
    pub fn load_or_default(&self) -> AppSettings {
        match self.load() {
            Ok(Some(settings)) => settings,
            Ok(None) => AppSettings::default(),
            Err(e) => {
                warn!("Ignoring unreadable settings at {}: {:#}", self.path.display(), e);
                AppSettings::default()
            }
        }
    }

    pub fn load(&self) -> Result<Option<AppSettings>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        let settings = serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(Some(settings))
    }

    pub fn save(&self, settings: &AppSettings) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let bytes = serde_json::to_vec_pretty(settings)?;
        fs::write(&self.path, bytes)
            .with_context(|| format!("writing {}", self.path.display()))?;
        info!("Saved settings to {}", self.path.display());
        Ok(())
    }
}
