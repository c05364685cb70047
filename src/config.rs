use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const APP_NAME: &str = "TimelineBoard";
pub const VISIBLE_YEAR_CHOICES: [u8; 3] = [1, 2, 3];

/// Persisted application preferences.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    /// Width of the timeline window in years.
    pub visible_years: u8,
    /// Directory holding projects.json, contacts.json and capacity.json.
    pub data_dir: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub open_after_export: bool,
    /// `tracing` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            visible_years: 1,
            data_dir: None,
            export_dir: None,
            open_after_export: true,
            log_filter: "info".into(),
        }
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
}

impl AppSettings {
    pub fn default_path() -> PathBuf {
        match project_dirs() {
            Some(dirs) => dirs.config_dir().join("settings.json"),
            None => PathBuf::from(".").join("settings.json"),
        }
    }

    /// Load settings, falling back to defaults for a missing or unreadable file.
    pub fn load(path: &Path) -> Self {
        let mut settings: AppSettings = match std::fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring invalid settings file");
                AppSettings::default()
            }),
            Err(_) => AppSettings::default(),
        };
        if !VISIBLE_YEAR_CHOICES.contains(&settings.visible_years) {
            tracing::warn!(years = settings.visible_years, "visible years out of range, using 1");
            settings.visible_years = 1;
        }
        settings
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        let write_error = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        std::fs::write(path, json).map_err(write_error)
    }

    pub fn set_visible_years(&mut self, years: u8) -> Result<(), ConfigError> {
        if !VISIBLE_YEAR_CHOICES.contains(&years) {
            return Err(ConfigError::VisibleYears(years));
        }
        self.visible_years = years;
        Ok(())
    }

    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        match project_dirs() {
            Some(dirs) => dirs.data_dir().to_path_buf(),
            None => PathBuf::from("data"),
        }
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| self.data_dir().join("exports"))
    }
}
