// SPDX-License-Identifier: MPL-2.0
//! Style handles: the loaded visual theme plus everything registered
//! against it (images, sources, layers).

use crate::map::layer::SymbolLayer;
use crate::map::source::GeoJsonSource;
use iced::widget::image::Handle;
use iced::Color;
use std::collections::HashMap;

/// Built-in visual themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StyleUri {
    #[default]
    Dark,
    Light,
}

impl StyleUri {
    /// Base map background for the theme.
    pub fn background(&self) -> Color {
        match self {
            StyleUri::Dark => Color::from_rgb8(0x12, 0x16, 0x1e),
            StyleUri::Light => Color::from_rgb8(0xe8, 0xea, 0xed),
        }
    }
}

/// Animation settings applied when style properties change. The viewer
/// disables them so markers appear without a fade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionOptions {
    pub duration_ms: u64,
    pub delay_ms: u64,
    pub enable_placement_transitions: bool,
}

impl TransitionOptions {
    pub fn new(duration_ms: u64, delay_ms: u64, enable_placement_transitions: bool) -> Self {
        Self {
            duration_ms,
            delay_ms,
            enable_placement_transitions,
        }
    }
}

impl Default for TransitionOptions {
    fn default() -> Self {
        Self::new(300, 0, true)
    }
}

/// A decoded bitmap registered under a name in the style.
#[derive(Debug, Clone)]
pub struct StyleImage {
    pub width: u32,
    pub height: u32,
    pub handle: Handle,
}

impl StyleImage {
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self {
            width,
            height,
            handle: Handle::from_rgba(width, height, rgba),
        }
    }
}

/// A loaded style: theme, transition settings and the registries the
/// screen controller fills in once the style is ready.
#[derive(Debug, Clone)]
pub struct Style {
    uri: StyleUri,
    transition: TransitionOptions,
    images: HashMap<String, StyleImage>,
    sources: HashMap<String, GeoJsonSource>,
    layers: Vec<SymbolLayer>,
}

impl Style {
    pub fn new(uri: StyleUri) -> Self {
        Self {
            uri,
            transition: TransitionOptions::default(),
            images: HashMap::new(),
            sources: HashMap::new(),
            layers: Vec::new(),
        }
    }

    pub fn uri(&self) -> StyleUri {
        self.uri
    }

    pub fn background(&self) -> Color {
        self.uri.background()
    }

    pub fn set_transition(&mut self, transition: TransitionOptions) {
        self.transition = transition;
    }

    pub fn transition(&self) -> TransitionOptions {
        self.transition
    }

    /// Registers a named image; a later registration replaces an
    /// earlier one under the same name.
    pub fn add_image(&mut self, name: impl Into<String>, image: StyleImage) {
        self.images.insert(name.into(), image);
    }

    pub fn image(&self, name: &str) -> Option<&StyleImage> {
        self.images.get(name)
    }

    pub fn add_source(&mut self, source: GeoJsonSource) {
        self.sources.insert(source.id().to_string(), source);
    }

    pub fn source(&self, id: &str) -> Option<&GeoJsonSource> {
        self.sources.get(id)
    }

    pub fn sources_mut(&mut self) -> impl Iterator<Item = &mut GeoJsonSource> {
        self.sources.values_mut()
    }

    /// Appends a layer; layers render in insertion order.
    pub fn add_layer(&mut self, layer: SymbolLayer) {
        self.layers.push(layer);
    }

    pub fn layer(&self, id: &str) -> Option<&SymbolLayer> {
        self.layers.iter().find(|layer| layer.id() == id)
    }

    pub fn layers(&self) -> &[SymbolLayer] {
        &self.layers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::source::GeoJsonOptions;

    #[test]
    fn dark_and_light_backgrounds_differ() {
        assert_ne!(StyleUri::Dark.background(), StyleUri::Light.background());
    }

    #[test]
    fn transitions_can_be_disabled() {
        let mut style = Style::new(StyleUri::Dark);
        style.set_transition(TransitionOptions::new(0, 0, false));
        assert_eq!(style.transition().duration_ms, 0);
        assert!(!style.transition().enable_placement_transitions);
    }

    #[test]
    fn images_are_registered_by_name() {
        let mut style = Style::new(StyleUri::Dark);
        style.add_image("cluster", StyleImage::from_rgba(2, 2, vec![0; 16]));
        assert!(style.image("cluster").is_some());
        assert!(style.image("other").is_none());
        assert_eq!(style.image("cluster").unwrap().width, 2);
    }

    #[test]
    fn sources_are_registered_by_id() {
        let mut style = Style::new(StyleUri::Dark);
        style.add_source(GeoJsonSource::from_points(
            "markers",
            Vec::new(),
            GeoJsonOptions::new(),
        ));
        assert!(style.source("markers").is_some());
        assert_eq!(style.source("markers").unwrap().point_total(), 0);
    }

    #[test]
    fn layers_keep_insertion_order() {
        let mut style = Style::new(StyleUri::Dark);
        style.add_layer(SymbolLayer::new("unclustered-points", "markers"));
        for i in 0..4 {
            style.add_layer(SymbolLayer::new(format!("cluster-{i}"), "markers"));
        }
        let ids: Vec<&str> = style.layers().iter().map(SymbolLayer::id).collect();
        assert_eq!(
            ids,
            vec![
                "unclustered-points",
                "cluster-0",
                "cluster-1",
                "cluster-2",
                "cluster-3"
            ]
        );
        assert!(style.layer("cluster-2").is_some());
    }
}
