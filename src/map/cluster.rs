// SPDX-License-Identifier: MPL-2.0
//! Point aggregation for clustered sources.
//!
//! Clustering runs per integer zoom level: points are projected to
//! world pixels and greedily merged into the first cluster within the
//! configured radius. Results are kept in a small LRU cache keyed by
//! zoom level so panning at a fixed zoom never re-clusters.

use crate::map::expression::Properties;
use crate::map::geo::LonLat;
use lru::LruCache;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Property key carrying the number of aggregated points on a cluster.
pub const POINT_COUNT: &str = "point_count";

/// Property key marking a feature as a cluster.
pub const CLUSTER: &str = "cluster";

/// Zoom levels kept in the cluster cache.
const CACHE_LEVELS: usize = 12;

/// A raw input point: position plus its original properties.
#[derive(Debug, Clone)]
pub struct MarkerPoint {
    pub position: LonLat,
    pub properties: Properties,
}

/// A feature emitted by the source at a given zoom: either an original
/// point (properties untouched) or a cluster carrying [`POINT_COUNT`].
#[derive(Debug, Clone)]
pub struct SourceFeature {
    pub position: LonLat,
    pub properties: Properties,
}

impl SourceFeature {
    /// Number of aggregated points, when this feature is a cluster.
    pub fn point_count(&self) -> Option<u64> {
        self.properties.get(POINT_COUNT).and_then(Value::as_u64)
    }
}

struct Bucket {
    sum_x: f64,
    sum_y: f64,
    members: Vec<usize>,
}

pub struct ClusterIndex {
    points: Vec<MarkerPoint>,
    radius: f64,
    max_zoom: u8,
    cache: LruCache<u8, Arc<Vec<SourceFeature>>>,
}

impl std::fmt::Debug for ClusterIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterIndex")
            .field("points", &self.points.len())
            .field("radius", &self.radius)
            .field("max_zoom", &self.max_zoom)
            .field("cached_levels", &self.cache.len())
            .finish()
    }
}

impl Clone for ClusterIndex {
    fn clone(&self) -> Self {
        // The cache is derived data; a clone starts cold.
        Self::new(self.points.clone(), self.radius, self.max_zoom)
    }
}

impl ClusterIndex {
    pub fn new(points: Vec<MarkerPoint>, radius: f64, max_zoom: u8) -> Self {
        Self {
            points,
            radius: radius.max(0.0),
            max_zoom,
            cache: LruCache::new(
                NonZeroUsize::new(CACHE_LEVELS).expect("cache capacity is non-zero"),
            ),
        }
    }

    pub fn point_total(&self) -> usize {
        self.points.len()
    }

    /// Returns the features visible at a (fractional) zoom. Clustering
    /// applies up to and including the configured max cluster zoom;
    /// above it every original point is returned as-is.
    pub fn features_at(&mut self, zoom: f64) -> Arc<Vec<SourceFeature>> {
        let level = zoom.floor().clamp(0.0, 30.0) as u8;
        if level > self.max_zoom || self.radius <= 0.0 {
            return self.raw_features();
        }
        if let Some(cached) = self.cache.get(&level) {
            return Arc::clone(cached);
        }
        let computed = Arc::new(self.cluster_level(level));
        self.cache.put(level, Arc::clone(&computed));
        computed
    }

    /// Drops all cached cluster levels; used on low-memory signals.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn raw_features(&mut self) -> Arc<Vec<SourceFeature>> {
        // Past the max cluster zoom every level looks the same, so a
        // single sentinel entry is enough.
        let sentinel = self.max_zoom.saturating_add(1);
        if let Some(cached) = self.cache.get(&sentinel) {
            return Arc::clone(cached);
        }
        let features: Vec<SourceFeature> = self
            .points
            .iter()
            .map(|p| SourceFeature {
                position: p.position,
                properties: p.properties.clone(),
            })
            .collect();
        let features = Arc::new(features);
        self.cache.put(sentinel, Arc::clone(&features));
        features
    }

    fn cluster_level(&self, level: u8) -> Vec<SourceFeature> {
        let zoom = f64::from(level);
        let radius = self.radius;
        // Grid cells are one radius wide, so any point within `radius`
        // of a cluster anchor lives in the anchor's cell or one of the
        // eight neighbors.
        let cell = radius;

        let projected: Vec<(f64, f64)> = self
            .points
            .iter()
            .map(|p| p.position.project(zoom))
            .collect();

        let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
        let mut buckets: Vec<Bucket> = Vec::new();

        for (idx, &(x, y)) in projected.iter().enumerate() {
            let cx = (x / cell).floor() as i64;
            let cy = (y / cell).floor() as i64;

            let mut joined = None;
            'search: for nx in cx - 1..=cx + 1 {
                for ny in cy - 1..=cy + 1 {
                    let Some(candidates) = grid.get(&(nx, ny)) else {
                        continue;
                    };
                    for &bucket_idx in candidates {
                        let bucket = &buckets[bucket_idx];
                        let anchor = projected[bucket.members[0]];
                        let dx = x - anchor.0;
                        let dy = y - anchor.1;
                        if dx * dx + dy * dy <= radius * radius {
                            joined = Some(bucket_idx);
                            break 'search;
                        }
                    }
                }
            }

            match joined {
                Some(bucket_idx) => {
                    let bucket = &mut buckets[bucket_idx];
                    bucket.sum_x += x;
                    bucket.sum_y += y;
                    bucket.members.push(idx);
                }
                None => {
                    let bucket_idx = buckets.len();
                    buckets.push(Bucket {
                        sum_x: x,
                        sum_y: y,
                        members: vec![idx],
                    });
                    grid.entry((cx, cy)).or_default().push(bucket_idx);
                }
            }
        }

        buckets
            .into_iter()
            .map(|bucket| {
                if bucket.members.len() == 1 {
                    let point = &self.points[bucket.members[0]];
                    SourceFeature {
                        position: point.position,
                        properties: point.properties.clone(),
                    }
                } else {
                    let n = bucket.members.len() as f64;
                    let position = LonLat::unproject(bucket.sum_x / n, bucket.sum_y / n, zoom);
                    let mut properties = Properties::new();
                    properties.insert(CLUSTER.to_string(), Value::Bool(true));
                    properties.insert(POINT_COUNT.to_string(), json!(bucket.members.len()));
                    SourceFeature {
                        position,
                        properties,
                    }
                }
            })
            .collect()
    }
}
