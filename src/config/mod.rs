// SPDX-License-Identifier: MPL-2.0
//! User preferences, loaded from and saved to a `settings.toml` file.
//!
//! The config carries the map-provider access token and the optional
//! start position. A missing or unreadable file falls back to defaults;
//! the caller receives a warning message to surface as a notification.

use crate::app::paths;
use crate::error::Result;
use crate::map::{StyleUri, MAX_ZOOM, MIN_ZOOM};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILE: &str = "settings.toml";

/// Fallback start position when neither config nor saved state has one.
pub const DEFAULT_LONGITUDE: f64 = -122.4194;
pub const DEFAULT_LATITUDE: f64 = 37.7749;
pub const DEFAULT_ZOOM: f64 = 11.0;

/// Style selection as written in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleChoice {
    #[default]
    Dark,
    Light,
}

impl From<StyleChoice> for StyleUri {
    fn from(choice: StyleChoice) -> Self {
        match choice {
            StyleChoice::Dark => StyleUri::Dark,
            StyleChoice::Light => StyleUri::Light,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Map-provider access token handed to the map view at startup.
    pub access_token: Option<String>,
    #[serde(default)]
    pub style: Option<StyleChoice>,
    #[serde(default)]
    pub start_longitude: Option<f64>,
    #[serde(default)]
    pub start_latitude: Option<f64>,
    #[serde(default)]
    pub start_zoom: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_token: None,
            style: Some(StyleChoice::Dark),
            start_longitude: Some(DEFAULT_LONGITUDE),
            start_latitude: Some(DEFAULT_LATITUDE),
            start_zoom: Some(DEFAULT_ZOOM),
        }
    }
}

impl Config {
    /// Start zoom, clamped into the supported range so a hand-edited
    /// config cannot request a nonsensical camera.
    pub fn start_zoom(&self) -> f64 {
        self.start_zoom
            .unwrap_or(DEFAULT_ZOOM)
            .clamp(MIN_ZOOM, MAX_ZOOM)
    }
}

/// Loads the configuration from the default location.
///
/// Returns the config and an optional warning message. Load failures
/// never abort startup; the warning is shown as a notification.
pub fn load() -> (Config, Option<String>) {
    let Some(dir) = paths::get_app_config_dir() else {
        return (Config::default(), None);
    };
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return (Config::default(), None);
    }
    match load_from_path(&path) {
        Ok(config) => (config, None),
        Err(err) => {
            tracing::warn!(%err, "failed to read settings, using defaults");
            (
                Config::default(),
                Some("Settings could not be read; defaults are in use".to_string()),
            )
        }
    }
}

/// Saves the configuration to the default location.
pub fn save(config: &Config) -> Result<()> {
    if let Some(dir) = paths::get_app_config_dir() {
        return save_to_path(config, &dir.join(CONFIG_FILE));
    }
    Ok(())
}

pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_and_load_round_trip_preserves_token() {
        let config = Config {
            access_token: Some("pk.test-token".to_string()),
            style: Some(StyleChoice::Dark),
            start_longitude: Some(2.3522),
            start_latitude: Some(48.8566),
            start_zoom: Some(9.5),
        };
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("settings.toml");

        save_to_path(&config, &config_path).expect("failed to save config");
        let loaded = load_from_path(&config_path).expect("failed to load config");

        assert_eq!(loaded, config);
    }

    #[test]
    fn load_from_path_errors_on_invalid_toml() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "not = valid = toml").expect("failed to write invalid toml");

        assert!(load_from_path(&config_path).is_err());
    }

    #[test]
    fn save_to_path_creates_parent_directories() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("deep").join("path").join("settings.toml");

        save_to_path(&Config::default(), &config_path).expect("save should create directories");
        assert!(config_path.exists());
    }

    #[test]
    fn default_config_targets_dark_style() {
        let config = Config::default();
        assert_eq!(config.style, Some(StyleChoice::Dark));
        assert!(config.access_token.is_none());
        assert_eq!(config.start_zoom(), DEFAULT_ZOOM);
    }

    #[test]
    fn start_zoom_is_clamped() {
        let config = Config {
            start_zoom: Some(99.0),
            ..Config::default()
        };
        assert_eq!(config.start_zoom(), MAX_ZOOM);
    }

    #[test]
    fn style_choice_converts_to_style_uri() {
        assert_eq!(StyleUri::from(StyleChoice::Dark), StyleUri::Dark);
        assert_eq!(StyleUri::from(StyleChoice::Light), StyleUri::Light);
    }
}
