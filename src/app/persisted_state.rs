// SPDX-License-Identifier: MPL-2.0
//! Application state persistence using CBOR format.
//!
//! Holds transient state that should survive sessions but is not
//! user-configurable: the last camera position, written when the
//! save-state lifecycle forwarding runs on window close. Stored in CBOR
//! to keep it clearly separate from the user-editable TOML preferences.

use super::paths;
use crate::map::Camera;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

/// State file name within the app data directory.
const STATE_FILE: &str = "state.cbor";

/// Application state that persists across sessions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppState {
    /// Camera position when the map view was last destroyed.
    #[serde(default)]
    pub last_camera: Option<Camera>,
}

impl AppState {
    /// Loads application state from the default location.
    ///
    /// Returns the state and an optional warning. Failures fall back to
    /// the default state; the warning is surfaced as a notification.
    pub fn load() -> (Self, Option<String>) {
        Self::load_from(None)
    }

    /// Loads application state, optionally from a custom base directory
    /// (tests use this to avoid touching the real data dir).
    pub fn load_from(base_dir: Option<PathBuf>) -> (Self, Option<String>) {
        let Some(path) = Self::state_file_path(base_dir) else {
            return (Self::default(), None);
        };
        if !path.exists() {
            return (Self::default(), None);
        }

        match fs::File::open(&path) {
            Ok(file) => match ciborium::from_reader(BufReader::new(file)) {
                Ok(state) => (state, None),
                Err(_) => (
                    Self::default(),
                    Some("Saved state could not be parsed; starting fresh".to_string()),
                ),
            },
            Err(_) => (
                Self::default(),
                Some("Saved state could not be read; starting fresh".to_string()),
            ),
        }
    }

    /// Saves application state to the default location. Returns an
    /// optional warning message if the save failed.
    pub fn save(&self) -> Option<String> {
        self.save_to(None)
    }

    /// Saves application state, optionally into a custom base directory.
    pub fn save_to(&self, base_dir: Option<PathBuf>) -> Option<String> {
        let path = Self::state_file_path(base_dir)?;
        if let Some(parent) = path.parent() {
            if fs::create_dir_all(parent).is_err() {
                return Some("Saved state could not be written".to_string());
            }
        }
        match fs::File::create(&path) {
            Ok(file) => match ciborium::into_writer(self, BufWriter::new(file)) {
                Ok(()) => None,
                Err(_) => Some("Saved state could not be written".to_string()),
            },
            Err(_) => Some("Saved state could not be written".to_string()),
        }
    }

    fn state_file_path(base_dir: Option<PathBuf>) -> Option<PathBuf> {
        paths::get_app_data_dir_with_override(base_dir).map(|dir| dir.join(STATE_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::LonLat;
    use tempfile::tempdir;

    #[test]
    fn default_state_has_no_camera() {
        assert!(AppState::default().last_camera.is_none());
    }

    #[test]
    fn save_and_load_round_trip_preserves_camera() {
        let temp_dir = tempdir().expect("temp dir");
        let base = Some(temp_dir.path().to_path_buf());

        let state = AppState {
            last_camera: Some(Camera::new(LonLat::new(13.405, 52.52), 12.5)),
        };
        assert!(state.save_to(base.clone()).is_none());

        let (loaded, warning) = AppState::load_from(base);
        assert!(warning.is_none());
        assert_eq!(loaded, state);
    }

    #[test]
    fn missing_state_file_loads_default_without_warning() {
        let temp_dir = tempdir().expect("temp dir");
        let (loaded, warning) = AppState::load_from(Some(temp_dir.path().to_path_buf()));
        assert!(warning.is_none());
        assert_eq!(loaded, AppState::default());
    }

    #[test]
    fn corrupt_state_file_loads_default_with_warning() {
        let temp_dir = tempdir().expect("temp dir");
        let base = temp_dir.path().to_path_buf();
        fs::create_dir_all(&base).expect("dir");
        fs::write(base.join(STATE_FILE), b"definitely not cbor").expect("write");

        let (loaded, warning) = AppState::load_from(Some(base));
        assert!(warning.is_some());
        assert_eq!(loaded, AppState::default());
    }

    #[test]
    fn save_into_conflicting_path_reports_warning() {
        let temp_dir = tempdir().expect("temp dir");
        let base = temp_dir.path().to_path_buf();
        // A directory where the state file should be makes the write fail.
        fs::create_dir_all(base.join(STATE_FILE)).expect("conflicting dir");

        let warning = AppState::default().save_to(Some(base));
        assert!(warning.is_some());
    }
}
