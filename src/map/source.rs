// SPDX-License-Identifier: MPL-2.0
//! GeoJSON point sources.
//!
//! A source owns the decoded marker points of one GeoJSON document and,
//! when clustering is enabled, the cluster index that aggregates them
//! per zoom level. Sources are referenced by name from symbol layers.

use crate::assets;
use crate::error::{Error, Result};
use crate::map::cluster::{ClusterIndex, MarkerPoint, SourceFeature};
use crate::map::expression::Properties;
use crate::map::geo::LonLat;
use geojson::{GeoJson, Value as Geometry};
use std::path::Path;
use std::sync::Arc;

/// URI scheme addressing files bundled into the binary.
pub const ASSET_SCHEME: &str = "asset";

/// Tuning options for a GeoJSON source, mirroring the declarative
/// options the screen controller passes when attaching it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoJsonOptions {
    cluster: bool,
    cluster_max_zoom: u8,
    cluster_radius: f64,
}

impl Default for GeoJsonOptions {
    fn default() -> Self {
        Self {
            cluster: false,
            cluster_max_zoom: 14,
            cluster_radius: 50.0,
        }
    }
}

impl GeoJsonOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cluster(mut self, cluster: bool) -> Self {
        self.cluster = cluster;
        self
    }

    /// Last zoom level on which points are still aggregated.
    #[must_use]
    pub fn with_cluster_max_zoom(mut self, max_zoom: u8) -> Self {
        self.cluster_max_zoom = max_zoom;
        self
    }

    /// Aggregation radius in screen pixels.
    #[must_use]
    pub fn with_cluster_radius(mut self, radius: f64) -> Self {
        self.cluster_radius = radius;
        self
    }

    pub fn cluster(&self) -> bool {
        self.cluster
    }

    pub fn cluster_max_zoom(&self) -> u8 {
        self.cluster_max_zoom
    }

    pub fn cluster_radius(&self) -> f64 {
        self.cluster_radius
    }
}

#[derive(Debug, Clone)]
pub struct GeoJsonSource {
    id: String,
    options: GeoJsonOptions,
    points: Vec<MarkerPoint>,
    index: Option<ClusterIndex>,
}

impl GeoJsonSource {
    /// Loads a source from an `asset://` URI addressing the bundle.
    ///
    /// This is the error path the screen controller guards: a URI with
    /// an unknown scheme, an empty path, or a path outside the bundle
    /// is rejected without touching the style.
    pub fn from_uri(id: impl Into<String>, uri: &str, options: GeoJsonOptions) -> Result<Self> {
        let (scheme, name) = uri
            .split_once("://")
            .ok_or_else(|| Error::Source(format!("malformed source uri: {uri}")))?;
        if scheme != ASSET_SCHEME {
            return Err(Error::Source(format!(
                "unsupported source uri scheme '{scheme}': {uri}"
            )));
        }
        if name.is_empty() || name.contains("://") {
            return Err(Error::Source(format!("malformed source uri: {uri}")));
        }
        let data = assets::get(name)
            .ok_or_else(|| Error::Source(format!("no bundled asset named '{name}'")))?;
        Self::from_slice(id, &data, options)
    }

    /// Loads a source from a GeoJSON file on disk.
    pub fn from_path(
        id: impl Into<String>,
        path: impl AsRef<Path>,
        options: GeoJsonOptions,
    ) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_slice(id, &data, options)
    }

    /// Decodes a GeoJSON document from raw bytes.
    pub fn from_slice(id: impl Into<String>, data: &[u8], options: GeoJsonOptions) -> Result<Self> {
        let text =
            std::str::from_utf8(data).map_err(|e| Error::Geo(format!("invalid encoding: {e}")))?;
        let geojson: GeoJson = text.parse()?;
        let points = collect_points(geojson);
        Ok(Self::from_points(id, points, options))
    }

    /// Builds a source from already-decoded points.
    pub fn from_points(
        id: impl Into<String>,
        points: Vec<MarkerPoint>,
        options: GeoJsonOptions,
    ) -> Self {
        let index = options.cluster.then(|| {
            ClusterIndex::new(
                points.clone(),
                options.cluster_radius,
                options.cluster_max_zoom,
            )
        });
        Self {
            id: id.into(),
            options,
            points,
            index,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn options(&self) -> &GeoJsonOptions {
        &self.options
    }

    pub fn point_total(&self) -> usize {
        self.points.len()
    }

    /// Features the source exposes at a zoom level: clusters when
    /// clustering applies, the raw points otherwise.
    pub fn features_at(&mut self, zoom: f64) -> Arc<Vec<SourceFeature>> {
        match &mut self.index {
            Some(index) => index.features_at(zoom),
            None => Arc::new(
                self.points
                    .iter()
                    .map(|p| SourceFeature {
                        position: p.position,
                        properties: p.properties.clone(),
                    })
                    .collect(),
            ),
        }
    }

    /// Releases derived data that can be rebuilt on demand.
    pub fn on_low_memory(&mut self) {
        if let Some(index) = &mut self.index {
            index.clear_cache();
        }
    }
}

/// Extracts point features from a parsed document. Non-point geometries
/// are skipped; the viewer only renders markers.
fn collect_points(geojson: GeoJson) -> Vec<MarkerPoint> {
    let features = match geojson {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(geometry) => vec![geojson::Feature {
            bbox: None,
            geometry: Some(geometry),
            id: None,
            properties: None,
            foreign_members: None,
        }],
    };

    let mut points = Vec::new();
    let mut skipped = 0_usize;
    for feature in features {
        match feature.geometry.map(|g| g.value) {
            Some(Geometry::Point(position)) if position.len() >= 2 => {
                points.push(MarkerPoint {
                    position: LonLat::new(position[0], position[1]),
                    properties: feature.properties.unwrap_or_else(Properties::new),
                });
            }
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::debug!(skipped, "ignored non-point features in source document");
    }
    points
}
