// SPDX-License-Identifier: MPL-2.0
//! Application root state and orchestration around the map view.
//!
//! The `App` struct owns the embedded map view, translates messages
//! into camera changes or style setup, and forwards window lifecycle
//! events to the map unchanged. Policy decisions (window sizing, where
//! the camera is persisted, how setup failures surface) stay close to
//! the update loop so user-facing behavior is easy to audit.

pub mod message;
pub mod paths;
pub mod persisted_state;
pub mod style_setup;
mod subscription;

pub use message::{Flags, Message};
pub use style_setup::{
    DatasetSpec, StyleLoadOutcome, CLUSTER_BUCKETS, CLUSTER_IMAGE, MARKERS_SOURCE,
    UNCLUSTERED_LAYER,
};

use crate::config::{self, Config};
use crate::map::{Camera, LonLat, MapView, StyleUri};
use crate::ui::map_canvas;
use crate::ui::notifications::{self, Notification};
use iced::widget::{canvas, Stack};
use iced::{window, Element, Subscription, Task, Theme};
use persisted_state::AppState;
use std::fmt;
use std::path::PathBuf;

pub const WINDOW_DEFAULT_WIDTH: u32 = 960;
pub const WINDOW_DEFAULT_HEIGHT: u32 = 640;
pub const MIN_WINDOW_WIDTH: u32 = 480;
pub const MIN_WINDOW_HEIGHT: u32 = 360;

/// Root Iced application state bridging the map view, notifications and
/// persisted preferences.
pub struct App {
    config: Config,
    app_state: AppState,
    map: MapView,
    canvas_cache: canvas::Cache,
    notifications: notifications::Manager,
    dataset: DatasetSpec,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("map", &self.map)
            .field("dataset", &self.dataset)
            .finish()
    }
}

/// Builds the window settings.
pub fn window_settings() -> window::Settings {
    let icon = crate::icon::load_window_icon();

    window::Settings {
        size: iced::Size::new(WINDOW_DEFAULT_WIDTH as f32, WINDOW_DEFAULT_HEIGHT as f32),
        min_size: Some(iced::Size::new(
            MIN_WINDOW_WIDTH as f32,
            MIN_WINDOW_HEIGHT as f32,
        )),
        icon,
        ..window::Settings::default()
    }
}

/// Entry point used by `main.rs` to launch the Iced application loop.
pub fn run(flags: Flags) -> iced::Result {
    use std::cell::RefCell;

    paths::init_cli_overrides(flags.data_dir.clone(), flags.config_dir.clone());

    // Wrap flags in RefCell<Option<_>> to satisfy the Fn trait
    // requirement while only consuming flags once (iced 0.14 requires
    // Fn, not FnOnce).
    let boot_state = RefCell::new(Some(flags));
    let boot = move || {
        let flags = boot_state
            .borrow_mut()
            .take()
            .expect("Boot function called more than once");
        App::new(flags)
    };

    iced::application(boot, App::update, App::view)
        .title(App::title)
        .theme(App::theme)
        .window(window_settings())
        .subscription(App::subscription)
        .run()
}

impl App {
    /// Initializes application state and kicks off the asynchronous
    /// style load that plays the map-ready callback.
    fn new(flags: Flags) -> (Self, Task<Message>) {
        let (config, config_warning) = config::load();
        let (app_state, state_warning) = AppState::load();

        let camera = app_state.last_camera.unwrap_or_else(|| {
            Camera::new(
                LonLat::new(
                    config.start_longitude.unwrap_or(config::DEFAULT_LONGITUDE),
                    config.start_latitude.unwrap_or(config::DEFAULT_LATITUDE),
                ),
                config.start_zoom(),
            )
        });

        let dataset = flags
            .file_path
            .as_deref()
            .map(|path| DatasetSpec::File(PathBuf::from(path)))
            .unwrap_or_default();

        let mut app = App {
            map: MapView::new(config.access_token.clone(), camera),
            config,
            app_state,
            canvas_cache: canvas::Cache::new(),
            notifications: notifications::Manager::new(),
            dataset,
        };

        if let Some(warning) = config_warning {
            app.notifications.push(Notification::warning(warning));
        }
        if let Some(warning) = state_warning {
            app.notifications.push(Notification::warning(warning));
        }
        if !app.map.has_access_token() {
            app.notifications.push(Notification::warning(
                "No access token configured; using the built-in offline style",
            ));
        }

        let style_uri = StyleUri::from(app.config.style.unwrap_or_default());
        let dataset = app.dataset.clone();
        let task = Task::perform(
            style_setup::load(style_uri, dataset),
            Message::StyleLoaded,
        );

        (app, task)
    }

    fn title(&self) -> String {
        match &self.dataset {
            DatasetSpec::File(path) => {
                let file_name = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .unwrap_or("Unknown");
                format!("{file_name} - IcedAtlas")
            }
            DatasetSpec::Bundled(_) => "IcedAtlas".to_string(),
        }
    }

    fn theme(&self) -> Theme {
        match StyleUri::from(self.config.style.unwrap_or_default()) {
            StyleUri::Dark => Theme::Dark,
            StyleUri::Light => Theme::Light,
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            subscription::create_event_subscription(),
            subscription::create_tick_subscription(self.notifications.has_notifications()),
        ])
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::StyleLoaded(outcome) => {
                if outcome.source_error.is_some() {
                    self.notifications.push(Notification::warning(
                        "Marker source unavailable; map shown without points",
                    ));
                }
                self.map.apply_style(outcome.style);
                self.canvas_cache.clear();
                Task::none()
            }
            Message::Canvas(map_canvas::Message::Panned { dx, dy }) => {
                self.map.pan_by(dx, dy);
                self.canvas_cache.clear();
                Task::none()
            }
            Message::Canvas(map_canvas::Message::Zoomed { delta, cursor }) => {
                self.map.zoom_by(delta, cursor);
                self.canvas_cache.clear();
                Task::none()
            }
            Message::WindowOpened => {
                self.map.on_start();
                self.map.on_resume();
                self.canvas_cache.clear();
                Task::none()
            }
            Message::WindowFocused => {
                self.map.on_resume();
                self.canvas_cache.clear();
                Task::none()
            }
            Message::WindowUnfocused => {
                self.map.on_pause();
                self.map.on_low_memory();
                Task::none()
            }
            Message::WindowResized(size) => {
                self.map.set_viewport(size);
                self.canvas_cache.clear();
                Task::none()
            }
            Message::WindowCloseRequested(id) => {
                self.app_state.last_camera = Some(self.map.save_state());
                if let Some(warning) = self.app_state.save() {
                    tracing::warn!(%warning, "failed to persist camera state");
                }
                self.map.on_stop();
                self.map.on_destroy();
                window::close(id)
            }
            Message::Tick(_instant) => {
                self.notifications.tick();
                Task::none()
            }
            Message::Notification(notification_message) => {
                self.notifications.handle_message(&notification_message);
                Task::none()
            }
        }
    }

    fn view(&self) -> Element<'_, Message> {
        let map = map_canvas::view(&self.map, &self.canvas_cache).map(Message::Canvas);

        if self.notifications.has_notifications() {
            let toasts =
                notifications::toast::view(&self.notifications).map(Message::Notification);
            Stack::new().push(map).push(toasts).into()
        } else {
            map
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{Lifecycle, StyleUri, MAX_ZOOM};
    use std::sync::{Mutex, OnceLock};
    use tempfile::tempdir;

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    /// Points both the config and data directories at a fresh temp dir
    /// so tests never touch real user files.
    fn with_temp_dirs<F>(test: F)
    where
        F: FnOnce(&std::path::Path),
    {
        let _guard = env_lock().lock().expect("failed to lock mutex");
        let temp_dir = tempdir().expect("failed to create temp dir");
        let previous_config = std::env::var(paths::ENV_CONFIG_DIR).ok();
        let previous_data = std::env::var(paths::ENV_DATA_DIR).ok();
        std::env::set_var(paths::ENV_CONFIG_DIR, temp_dir.path().join("config"));
        std::env::set_var(paths::ENV_DATA_DIR, temp_dir.path().join("data"));

        test(temp_dir.path());

        match previous_config {
            Some(value) => std::env::set_var(paths::ENV_CONFIG_DIR, value),
            None => std::env::remove_var(paths::ENV_CONFIG_DIR),
        }
        match previous_data {
            Some(value) => std::env::set_var(paths::ENV_DATA_DIR, value),
            None => std::env::remove_var(paths::ENV_DATA_DIR),
        }
    }

    fn loaded_outcome() -> StyleLoadOutcome {
        style_setup::build(StyleUri::Dark, &DatasetSpec::default())
    }

    #[test]
    fn new_starts_with_unconfigured_map() {
        with_temp_dirs(|_| {
            let (app, _task) = App::new(Flags::default());
            assert!(!app.map.is_configured());
            assert_eq!(app.map.lifecycle(), Lifecycle::Created);
        });
    }

    #[test]
    fn missing_access_token_shows_warning() {
        with_temp_dirs(|_| {
            let (app, _task) = App::new(Flags::default());
            assert!(app.notifications.has_notifications());
        });
    }

    #[test]
    fn configured_access_token_suppresses_warning() {
        with_temp_dirs(|root| {
            let config = Config {
                access_token: Some("pk.test".to_string()),
                ..Config::default()
            };
            let config_path = root.join("config").join("settings.toml");
            config::save_to_path(&config, &config_path).expect("save config");

            let (app, _task) = App::new(Flags::default());
            assert!(!app.notifications.has_notifications());
            assert!(app.map.has_access_token());
        });
    }

    #[test]
    fn style_loaded_configures_map_exactly_once() {
        with_temp_dirs(|_| {
            let (mut app, _task) = App::new(Flags::default());
            let _ = app.update(Message::StyleLoaded(loaded_outcome()));
            assert!(app.map.is_configured());
            assert_eq!(app.map.style().unwrap().uri(), StyleUri::Dark);

            // A duplicate callback must not replace the installed style.
            let second = style_setup::build(StyleUri::Light, &DatasetSpec::default());
            let _ = app.update(Message::StyleLoaded(second));
            assert_eq!(app.map.style().unwrap().uri(), StyleUri::Dark);
        });
    }

    #[test]
    fn source_failure_degrades_to_markerless_map() {
        with_temp_dirs(|root| {
            // Suppress the token warning so the assertion sees only the
            // source warning.
            let config = Config {
                access_token: Some("pk.test".to_string()),
                ..Config::default()
            };
            config::save_to_path(&config, &root.join("config").join("settings.toml"))
                .expect("save config");

            let (mut app, _task) = App::new(Flags::default());
            let outcome = style_setup::build(
                StyleUri::Dark,
                &DatasetSpec::Bundled("broken-uri".to_string()),
            );
            let _ = app.update(Message::StyleLoaded(outcome));

            assert!(app.map.is_configured());
            assert!(app.map.style().unwrap().source(MARKERS_SOURCE).is_none());
            assert!(app.notifications.has_notifications());
        });
    }

    #[test]
    fn window_lifecycle_is_forwarded_to_map_view() {
        with_temp_dirs(|_| {
            let (mut app, _task) = App::new(Flags::default());
            let _ = app.update(Message::WindowOpened);
            assert_eq!(app.map.lifecycle(), Lifecycle::Resumed);

            let _ = app.update(Message::WindowUnfocused);
            assert_eq!(app.map.lifecycle(), Lifecycle::Paused);

            let _ = app.update(Message::WindowFocused);
            assert_eq!(app.map.lifecycle(), Lifecycle::Resumed);
        });
    }

    #[test]
    fn resize_updates_map_viewport() {
        with_temp_dirs(|_| {
            let (mut app, _task) = App::new(Flags::default());
            let _ = app.update(Message::WindowResized(iced::Size::new(1280.0, 720.0)));
            assert_eq!(app.map.viewport(), iced::Size::new(1280.0, 720.0));
        });
    }

    #[test]
    fn canvas_gestures_move_the_camera() {
        with_temp_dirs(|_| {
            let (mut app, _task) = App::new(Flags::default());
            let before = app.map.camera();

            let _ = app.update(Message::Canvas(map_canvas::Message::Panned {
                dx: 40.0,
                dy: 0.0,
            }));
            assert!(app.map.camera().center.lon < before.center.lon);

            let _ = app.update(Message::Canvas(map_canvas::Message::Zoomed {
                delta: 100.0,
                cursor: None,
            }));
            assert_eq!(app.map.camera().zoom, MAX_ZOOM);
        });
    }

    #[test]
    fn close_request_persists_camera_and_destroys_map() {
        with_temp_dirs(|root| {
            let (mut app, _task) = App::new(Flags::default());
            let _ = app.update(Message::WindowOpened);
            let _ = app.update(Message::Canvas(map_canvas::Message::Panned {
                dx: 25.0,
                dy: -10.0,
            }));
            let camera = app.map.camera();

            let _ = app.update(Message::WindowCloseRequested(window::Id::unique()));
            assert_eq!(app.map.lifecycle(), Lifecycle::Destroyed);

            let (saved, warning) = AppState::load_from(Some(root.join("data")));
            assert!(warning.is_none());
            assert_eq!(saved.last_camera, Some(camera));
        });
    }

    #[test]
    fn saved_camera_is_restored_on_next_start() {
        with_temp_dirs(|root| {
            let state = AppState {
                last_camera: Some(Camera::new(LonLat::new(13.405, 52.52), 12.0)),
            };
            assert!(state.save_to(Some(root.join("data"))).is_none());

            let (app, _task) = App::new(Flags::default());
            assert_eq!(app.map.camera(), state.last_camera.unwrap());
        });
    }

    #[test]
    fn title_reflects_dataset_override() {
        with_temp_dirs(|_| {
            let (app, _task) = App::new(Flags::default());
            assert_eq!(app.title(), "IcedAtlas");

            let (app, _task) = App::new(Flags {
                file_path: Some("/tmp/hotspots.geojson".to_string()),
                ..Flags::default()
            });
            assert_eq!(app.title(), "hotspots.geojson - IcedAtlas");
        });
    }
}
