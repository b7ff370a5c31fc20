// SPDX-License-Identifier: MPL-2.0
//! Top-level messages and runtime flags for the application.

use super::style_setup::StyleLoadOutcome;
use crate::ui::map_canvas;
use crate::ui::notifications;
use iced::window;
use std::time::Instant;

/// Top-level messages consumed by `App::update`. The variants forward
/// lower-level component messages while keeping a single update
/// entrypoint.
#[derive(Debug, Clone)]
pub enum Message {
    /// The asynchronous map-ready callback: the style finished loading.
    StyleLoaded(StyleLoadOutcome),
    /// Camera gestures coming from the map canvas.
    Canvas(map_canvas::Message),
    Notification(notifications::Message),
    /// Window lifecycle, forwarded to the map view unchanged.
    WindowOpened,
    WindowFocused,
    WindowUnfocused,
    WindowResized(iced::Size),
    WindowCloseRequested(window::Id),
    /// Periodic tick for notification auto-dismiss.
    Tick(Instant),
}

/// Runtime flags passed in from the CLI to tweak startup behavior.
#[derive(Debug, Default)]
pub struct Flags {
    /// Optional GeoJSON file to view instead of the bundled dataset.
    pub file_path: Option<String>,
    /// Optional data directory override (for state files).
    /// Takes precedence over `ICED_ATLAS_DATA_DIR` environment variable.
    pub data_dir: Option<String>,
    /// Optional config directory override (for settings.toml).
    /// Takes precedence over `ICED_ATLAS_CONFIG_DIR` environment variable.
    pub config_dir: Option<String>,
}
