// SPDX-License-Identifier: MPL-2.0
//! The embedded map component.
//!
//! `MapView` plays the role the mapping SDK plays on mobile: it owns
//! the loaded [`Style`], the camera, and the screen-space scene derived
//! from both. The application configures it declaratively (style,
//! images, sources, layers) and forwards lifecycle events; everything
//! else — clustering, projection, filter evaluation, scene assembly —
//! happens in here.

pub mod cluster;
pub mod expression;
pub mod geo;
pub mod layer;
pub mod source;
pub mod style;

pub use cluster::{ClusterIndex, MarkerPoint, SourceFeature, CLUSTER, POINT_COUNT};
pub use expression::{Expression, Properties};
pub use geo::LonLat;
pub use layer::SymbolLayer;
pub use source::{GeoJsonOptions, GeoJsonSource};
pub use style::{Style, StyleImage, StyleUri, TransitionOptions};

use iced::{Color, Point, Size};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 22.0;

/// Camera position over the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub center: LonLat,
    pub zoom: f64,
}

impl Camera {
    pub fn new(center: LonLat, zoom: f64) -> Self {
        Self {
            center: center.wrapped(),
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }
}

/// Lifecycle states mirroring the events the screen controller
/// forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Started,
    Resumed,
    Paused,
    Stopped,
    Destroyed,
}

/// One icon placement in screen space.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    /// Top-left corner in canvas coordinates.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Name of the style image to draw.
    pub image: String,
}

/// Everything the canvas needs to paint one frame.
#[derive(Debug, Clone)]
pub struct Scene {
    pub background: Color,
    pub sprites: Vec<Sprite>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            background: StyleUri::default().background(),
            sprites: Vec::new(),
        }
    }
}

pub struct MapView {
    access_token: Option<String>,
    style: Option<Style>,
    configured: bool,
    camera: Camera,
    lifecycle: Lifecycle,
    viewport: Size,
    scene: Scene,
}

impl std::fmt::Debug for MapView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapView")
            .field("lifecycle", &self.lifecycle)
            .field("configured", &self.configured)
            .field("camera", &self.camera)
            .finish()
    }
}

impl MapView {
    /// Creates the view. The access token is the provider credential
    /// handed over at initialization; a missing token degrades to the
    /// built-in offline styles.
    pub fn new(access_token: Option<String>, camera: Camera) -> Self {
        Self {
            access_token,
            style: None,
            configured: false,
            camera,
            lifecycle: Lifecycle::Created,
            viewport: Size::new(960.0, 640.0),
            scene: Scene::default(),
        }
    }

    pub fn has_access_token(&self) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn style(&self) -> Option<&Style> {
        self.style.as_ref()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Installs the loaded style. The setup sequence runs exactly once:
    /// a second style-loaded callback is ignored.
    pub fn apply_style(&mut self, style: Style) -> bool {
        if self.configured || self.lifecycle == Lifecycle::Destroyed {
            tracing::debug!("ignoring duplicate style load");
            return false;
        }
        self.style = Some(style);
        self.configured = true;
        self.rebuild_scene();
        true
    }

    // ── Lifecycle forwarding ────────────────────────────────────────

    pub fn on_start(&mut self) {
        if matches!(self.lifecycle, Lifecycle::Created | Lifecycle::Stopped) {
            self.lifecycle = Lifecycle::Started;
        }
    }

    pub fn on_resume(&mut self) {
        if self.lifecycle != Lifecycle::Destroyed {
            self.lifecycle = Lifecycle::Resumed;
            self.rebuild_scene();
        }
    }

    pub fn on_pause(&mut self) {
        if self.lifecycle == Lifecycle::Resumed {
            self.lifecycle = Lifecycle::Paused;
        }
    }

    pub fn on_stop(&mut self) {
        if !matches!(self.lifecycle, Lifecycle::Destroyed) {
            self.lifecycle = Lifecycle::Stopped;
        }
    }

    /// Releases rebuildable data while keeping the configuration.
    pub fn on_low_memory(&mut self) {
        if let Some(style) = &mut self.style {
            for source in style.sources_mut() {
                source.on_low_memory();
            }
        }
    }

    pub fn on_destroy(&mut self) {
        self.lifecycle = Lifecycle::Destroyed;
        self.style = None;
        self.scene = Scene::default();
    }

    /// Returns the state worth persisting across sessions.
    pub fn save_state(&self) -> Camera {
        self.camera
    }

    // ── Camera and viewport ─────────────────────────────────────────

    pub fn set_viewport(&mut self, size: Size) {
        self.viewport = size;
        self.rebuild_scene();
    }

    /// Moves the camera by a screen-space delta in pixels.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        let zoom = self.camera.zoom;
        let (cx, cy) = self.camera.center.project(zoom);
        self.camera.center =
            LonLat::unproject(cx - f64::from(dx), cy - f64::from(dy), zoom).wrapped();
        self.rebuild_scene();
    }

    /// Changes the zoom by `delta` levels, keeping the geographic point
    /// under `anchor` fixed on screen. Without an anchor the viewport
    /// center is used.
    pub fn zoom_by(&mut self, delta: f64, anchor: Option<Point>) {
        let new_zoom = (self.camera.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);
        if (new_zoom - self.camera.zoom).abs() < f64::EPSILON {
            return;
        }
        let anchor = anchor.unwrap_or(Point::new(
            self.viewport.width / 2.0,
            self.viewport.height / 2.0,
        ));
        let focus = self.screen_to_lonlat(anchor);

        self.camera.zoom = new_zoom;
        let (fx, fy) = focus.project(new_zoom);
        let offset_x = f64::from(anchor.x - self.viewport.width / 2.0);
        let offset_y = f64::from(anchor.y - self.viewport.height / 2.0);
        self.camera.center = LonLat::unproject(fx - offset_x, fy - offset_y, new_zoom).wrapped();
        self.rebuild_scene();
    }

    /// Geographic position under a canvas point at the current camera.
    pub fn screen_to_lonlat(&self, point: Point) -> LonLat {
        let zoom = self.camera.zoom;
        let (cx, cy) = self.camera.center.project(zoom);
        let x = cx + f64::from(point.x - self.viewport.width / 2.0);
        let y = cy + f64::from(point.y - self.viewport.height / 2.0);
        LonLat::unproject(x, y, zoom)
    }

    // ── Scene assembly ──────────────────────────────────────────────

    /// Recomputes the screen-space scene from the style and camera.
    /// Skipped while paused, stopped or destroyed; the next resume
    /// rebuilds.
    pub fn rebuild_scene(&mut self) {
        if matches!(
            self.lifecycle,
            Lifecycle::Paused | Lifecycle::Stopped | Lifecycle::Destroyed
        ) {
            return;
        }
        let Some(style) = &mut self.style else {
            self.scene = Scene::default();
            return;
        };

        let zoom = self.camera.zoom;
        let mut feature_sets: HashMap<String, Arc<Vec<SourceFeature>>> = HashMap::new();
        for source in style.sources_mut() {
            feature_sets.insert(source.id().to_string(), source.features_at(zoom));
        }

        let (cx, cy) = self.camera.center.project(zoom);
        let half_w = f64::from(self.viewport.width) / 2.0;
        let half_h = f64::from(self.viewport.height) / 2.0;

        let mut sprites = Vec::new();
        for layer in style.layers() {
            let Some(features) = feature_sets.get(layer.source()) else {
                continue;
            };
            let Some(image_name) = layer.icon_image() else {
                continue;
            };
            let Some(image) = style.image(image_name) else {
                tracing::warn!(layer = layer.id(), image = image_name, "icon image not registered");
                continue;
            };

            let width = image.width as f32 * layer.icon_size();
            let height = image.height as f32 * layer.icon_size();
            let margin = f64::from(width.max(height));

            for feature in features.iter() {
                if !layer.allows(&feature.properties) {
                    continue;
                }
                let (fx, fy) = feature.position.project(zoom);
                let sx = half_w + (fx - cx);
                let sy = half_h + (fy - cy);
                if sx < -margin
                    || sy < -margin
                    || sx > half_w * 2.0 + margin
                    || sy > half_h * 2.0 + margin
                {
                    continue;
                }
                sprites.push(Sprite {
                    x: sx as f32 - width / 2.0,
                    y: sy as f32 - height / 2.0,
                    width,
                    height,
                    image: image_name.to_string(),
                });
            }
        }

        self.scene = Scene {
            background: style.background(),
            sprites,
        };
    }
}
