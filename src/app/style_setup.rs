// SPDX-License-Identifier: MPL-2.0
//! One-time style configuration performed when the map reports ready.
//!
//! This is the heart of the screen controller: select the theme with
//! transitions disabled, register the marker icon, attach the clustered
//! point source and declare the symbol layers. The cluster layers
//! partition `point_count` into four buckets with growing icon sizes;
//! the unclustered layer carries no filter.

use crate::assets;
use crate::error::{Error, Result};
use crate::map::expression::{all, get, gte, has, literal, lt, to_number};
use crate::map::{
    GeoJsonOptions, GeoJsonSource, Style, StyleImage, StyleUri, SymbolLayer, TransitionOptions,
    POINT_COUNT,
};
use std::path::PathBuf;

/// Name under which the marker bitmap is registered in the style.
pub const CLUSTER_IMAGE: &str = "cluster";

/// Identifier of the clustered point source.
pub const MARKERS_SOURCE: &str = "markers";

/// Identifier of the layer rendering non-aggregated points.
pub const UNCLUSTERED_LAYER: &str = "unclustered-points";

/// Lower bounds of the cluster-size buckets. Each bucket `i` renders
/// with icon size `1.0 + i`; the last bucket is open-ended.
pub const CLUSTER_BUCKETS: [i64; 4] = [0, 100, 1000, 10_000];

const UNCLUSTERED_ICON_SIZE: f32 = 0.8;

/// Where the marker dataset comes from.
#[derive(Debug, Clone)]
pub enum DatasetSpec {
    /// A bundled asset addressed by `asset://` URI.
    Bundled(String),
    /// A GeoJSON file passed on the command line.
    File(PathBuf),
}

impl Default for DatasetSpec {
    fn default() -> Self {
        Self::Bundled(assets::POINTS_URI.to_string())
    }
}

/// Result of the style setup. The style itself always loads; a failed
/// source attachment is reported separately so the map can still render
/// without markers.
#[derive(Debug, Clone)]
pub struct StyleLoadOutcome {
    pub style: Style,
    pub source_error: Option<Error>,
}

/// Async entry point driven by the application's map-ready task. The
/// decode work runs on a blocking thread so the UI executor stays
/// responsive while large datasets parse.
pub async fn load(style_uri: StyleUri, dataset: DatasetSpec) -> StyleLoadOutcome {
    match tokio::task::spawn_blocking(move || build(style_uri, &dataset)).await {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::error!(%err, "style setup task failed");
            StyleLoadOutcome {
                style: Style::new(style_uri),
                source_error: None,
            }
        }
    }
}

/// Builds the fully configured style.
pub fn build(style_uri: StyleUri, dataset: &DatasetSpec) -> StyleLoadOutcome {
    let mut style = Style::new(style_uri);
    style.set_transition(TransitionOptions::new(0, 0, false));

    init_layer_icon(&mut style);
    let source_error = add_clustered_geojson_source(&mut style, dataset).err();
    add_symbol_layers(&mut style);

    StyleLoadOutcome {
        style,
        source_error,
    }
}

/// Decodes the bundled marker bitmap and registers it in the style.
/// Failure leaves the registry empty; layers referencing the missing
/// image simply draw nothing.
fn init_layer_icon(style: &mut Style) {
    match decode_marker_icon() {
        Ok(image) => style.add_image(CLUSTER_IMAGE, image),
        Err(err) => tracing::error!(%err, "failed to decode marker icon"),
    }
}

fn decode_marker_icon() -> Result<StyleImage> {
    let bytes = assets::get(assets::MARKER_ICON)
        .ok_or_else(|| Error::Image("marker icon missing from bundle".to_string()))?;
    let decoded = image_rs::load_from_memory(&bytes)?.to_rgba8();
    Ok(StyleImage::from_rgba(
        decoded.width(),
        decoded.height(),
        decoded.into_raw(),
    ))
}

/// Attaches the clustered point source. A malformed URI (or unreadable
/// file) is logged and aborts only the source setup; the map still
/// renders, without points. Not retried.
fn add_clustered_geojson_source(style: &mut Style, dataset: &DatasetSpec) -> Result<()> {
    let options = GeoJsonOptions::new()
        .with_cluster(true)
        .with_cluster_max_zoom(25)
        .with_cluster_radius(15.0);

    let source = match dataset {
        DatasetSpec::Bundled(uri) => GeoJsonSource::from_uri(MARKERS_SOURCE, uri, options),
        DatasetSpec::File(path) => GeoJsonSource::from_path(MARKERS_SOURCE, path, options),
    };

    match source {
        Ok(source) => {
            style.add_source(source);
            Ok(())
        }
        Err(err) => {
            tracing::error!(%err, "check the source uri");
            Err(err)
        }
    }
}

fn add_symbol_layers(style: &mut Style) {
    style.add_layer(
        SymbolLayer::new(UNCLUSTERED_LAYER, MARKERS_SOURCE)
            .with_icon_image(CLUSTER_IMAGE)
            .with_icon_size(UNCLUSTERED_ICON_SIZE),
    );

    for (i, &lower) in CLUSTER_BUCKETS.iter().enumerate() {
        let point_count = || to_number(get(POINT_COUNT));
        let filter = if i == CLUSTER_BUCKETS.len() - 1 {
            all([has(POINT_COUNT), gte(point_count(), literal(lower))])
        } else {
            all([
                has(POINT_COUNT),
                gte(point_count(), literal(lower)),
                lt(point_count(), literal(CLUSTER_BUCKETS[i + 1])),
            ])
        };

        style.add_layer(
            SymbolLayer::new(format!("cluster-{i}"), MARKERS_SOURCE)
                .with_icon_image(CLUSTER_IMAGE)
                .with_icon_size(1.0 + i as f32)
                .with_filter(filter),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Properties;
    use serde_json::json;

    fn built() -> StyleLoadOutcome {
        build(StyleUri::Dark, &DatasetSpec::default())
    }

    fn count_props(count: i64) -> Properties {
        let mut props = Properties::new();
        props.insert(POINT_COUNT.to_string(), json!(count));
        props
    }

    #[test]
    fn bundled_dataset_attaches_without_error() {
        let outcome = built();
        assert!(outcome.source_error.is_none());
        let source = outcome.style.source(MARKERS_SOURCE).expect("source");
        assert!(source.options().cluster());
        assert_eq!(source.options().cluster_max_zoom(), 25);
        assert_eq!(source.options().cluster_radius(), 15.0);
        assert!(source.point_total() > 0);
    }

    #[test]
    fn transitions_are_disabled() {
        let style = built().style;
        let transition = style.transition();
        assert_eq!(transition.duration_ms, 0);
        assert_eq!(transition.delay_ms, 0);
        assert!(!transition.enable_placement_transitions);
    }

    #[test]
    fn marker_icon_is_registered() {
        let style = built().style;
        let image = style.image(CLUSTER_IMAGE).expect("icon");
        assert_eq!(image.width, 32);
        assert_eq!(image.height, 32);
    }

    #[test]
    fn five_layers_in_declaration_order() {
        let style = built().style;
        let ids: Vec<&str> = style.layers().iter().map(|l| l.id()).collect();
        assert_eq!(
            ids,
            vec![
                UNCLUSTERED_LAYER,
                "cluster-0",
                "cluster-1",
                "cluster-2",
                "cluster-3"
            ]
        );
    }

    #[test]
    fn unclustered_layer_has_no_filter_and_small_icon() {
        let style = built().style;
        let layer = style.layer(UNCLUSTERED_LAYER).expect("layer");
        assert!(layer.filter().is_none());
        assert_eq!(layer.icon_size(), UNCLUSTERED_ICON_SIZE);
        assert_eq!(layer.icon_image(), Some(CLUSTER_IMAGE));
        // Accepts any feature lacking point_count.
        let mut props = Properties::new();
        props.insert("name".to_string(), json!("Plaza #017"));
        assert!(layer.allows(&props));
    }

    #[test]
    fn cluster_icon_sizes_grow_with_bucket_index() {
        let style = built().style;
        for i in 0..CLUSTER_BUCKETS.len() {
            let layer = style.layer(&format!("cluster-{i}")).expect("layer");
            assert_eq!(layer.icon_size(), 1.0 + i as f32);
            assert_eq!(layer.icon_image(), Some(CLUSTER_IMAGE));
        }
    }

    #[test]
    fn point_count_50_matches_only_first_cluster_layer() {
        let style = built().style;
        let props = count_props(50);
        let matching: Vec<&str> = style
            .layers()
            .iter()
            .filter(|l| l.filter().is_some() && l.allows(&props))
            .map(|l| l.id())
            .collect();
        assert_eq!(matching, vec!["cluster-0"]);
    }

    #[test]
    fn point_count_10000_matches_only_last_cluster_layer() {
        let style = built().style;
        let props = count_props(10_000);
        let matching: Vec<&str> = style
            .layers()
            .iter()
            .filter(|l| l.filter().is_some() && l.allows(&props))
            .map(|l| l.id())
            .collect();
        assert_eq!(matching, vec!["cluster-3"]);
    }

    #[test]
    fn bucket_boundaries_are_half_open() {
        let style = built().style;
        for (count, expected) in [(99, "cluster-0"), (100, "cluster-1"), (999, "cluster-1"),
            (1000, "cluster-2"), (9999, "cluster-2"), (123_456, "cluster-3")]
        {
            let props = count_props(count);
            let matching: Vec<&str> = style
                .layers()
                .iter()
                .filter(|l| l.filter().is_some() && l.allows(&props))
                .map(|l| l.id())
                .collect();
            assert_eq!(matching, vec![expected], "point_count={count}");
        }
    }

    #[test]
    fn cluster_layers_reject_plain_points() {
        let style = built().style;
        let mut props = Properties::new();
        props.insert("name".to_string(), json!("Market #042"));
        for i in 0..CLUSTER_BUCKETS.len() {
            let layer = style.layer(&format!("cluster-{i}")).expect("layer");
            assert!(!layer.allows(&props));
        }
    }

    #[test]
    fn malformed_uri_aborts_source_setup_but_style_loads() {
        let outcome = build(
            StyleUri::Dark,
            &DatasetSpec::Bundled("points.geojson".to_string()),
        );
        assert!(matches!(outcome.source_error, Some(Error::Source(_))));
        // Style still carries icon and layers; only the source is missing.
        assert!(outcome.style.source(MARKERS_SOURCE).is_none());
        assert_eq!(outcome.style.layers().len(), 5);
        assert!(outcome.style.image(CLUSTER_IMAGE).is_some());
    }

    #[test]
    fn missing_file_aborts_source_setup() {
        let outcome = build(
            StyleUri::Dark,
            &DatasetSpec::File(PathBuf::from("/nonexistent/points.geojson")),
        );
        assert!(outcome.source_error.is_some());
        assert!(outcome.style.source(MARKERS_SOURCE).is_none());
    }
}
