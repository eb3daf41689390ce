//! Browser shell configuration: loading, saving, and defaults.
//!
//! The configuration lives in `config.toml` under the profile directory
//! (platform config dir by default, overridable for alternate profiles).
//! Missing files and missing keys fall back to defaults so a fresh profile
//! starts without any setup.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_start_page() -> String {
    "about:blank".to_string()
}

fn default_true() -> bool {
    true
}

fn default_zoom() -> f32 {
    1.0
}

/// Top-level shell configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Page opened in new windows and tabs when no URL is given.
    pub start_page: String,

    /// Save open windows and tabs on exit and restore them on next launch.
    pub restore_session: bool,

    /// Ask for confirmation before closing a window that has tabs with
    /// unsubmitted form data.
    pub confirm_close_dirty_forms: bool,

    /// Ask for confirmation before closing a window with ongoing downloads.
    pub confirm_close_downloads: bool,

    /// Administrative lockdown: refuse every window close request.
    pub lockdown_disable_quit: bool,

    /// When set, the process runs in single-site application mode scoped
    /// to this origin.
    pub application_origin: Option<String>,

    /// Default chrome for new browser windows.
    pub show_menu_bar: bool,
    pub show_toolbar: bool,
    pub show_location_bar: bool,
    pub show_tab_strip: bool,
    pub show_downloads_tray: bool,

    /// Zoom level applied to newly created tabs.
    pub default_zoom: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start_page: default_start_page(),
            restore_session: true,
            confirm_close_dirty_forms: true,
            confirm_close_downloads: true,
            lockdown_disable_quit: false,
            application_origin: None,
            show_menu_bar: default_true(),
            show_toolbar: default_true(),
            show_location_bar: default_true(),
            show_tab_strip: default_true(),
            show_downloads_tray: default_true(),
            default_zoom: default_zoom(),
        }
    }
}

impl Config {
    /// Default profile directory: `<platform config dir>/gossamer`.
    pub fn profile_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gossamer")
    }

    /// Path of the config file inside a profile directory.
    pub fn config_path(profile_dir: &Path) -> PathBuf {
        profile_dir.join("config.toml")
    }

    /// Load the configuration from the default profile directory.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::profile_dir())
    }

    /// Load the configuration from a specific profile directory.
    ///
    /// A missing config file yields the defaults; a present but malformed
    /// file is an error so typos do not silently reset the profile.
    pub fn load_from(profile_dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::config_path(profile_dir);
        if !path.exists() {
            log::debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save the configuration into a profile directory, creating it if
    /// necessary.
    pub fn save_to(&self, profile_dir: &Path) -> Result<(), ConfigError> {
        let path = Self::config_path(profile_dir);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: path.clone(),
                source,
            })?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|source| ConfigError::Write {
            path: path.clone(),
            source,
        })?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}
