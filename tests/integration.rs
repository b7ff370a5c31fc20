// SPDX-License-Identifier: MPL-2.0
use iced_atlas::app::persisted_state::AppState;
use iced_atlas::config::{self, Config, StyleChoice};
use iced_atlas::map::source::{GeoJsonOptions, GeoJsonSource};
use iced_atlas::map::{Camera, LonLat};
use tempfile::tempdir;

#[test]
fn test_config_change_round_trips_through_file() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let config_path = dir.path().join("settings.toml");

    let initial = Config {
        access_token: Some("pk.first".to_string()),
        style: Some(StyleChoice::Dark),
        ..Config::default()
    };
    config::save_to_path(&initial, &config_path).expect("Failed to write initial config");
    let loaded = config::load_from_path(&config_path).expect("Failed to load initial config");
    assert_eq!(loaded.access_token.as_deref(), Some("pk.first"));

    let changed = Config {
        access_token: Some("pk.second".to_string()),
        style: Some(StyleChoice::Light),
        ..Config::default()
    };
    config::save_to_path(&changed, &config_path).expect("Failed to write changed config");
    let loaded = config::load_from_path(&config_path).expect("Failed to load changed config");
    assert_eq!(loaded.access_token.as_deref(), Some("pk.second"));
    assert_eq!(loaded.style, Some(StyleChoice::Light));
}

#[test]
fn test_camera_state_round_trips_through_state_file() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let base = Some(dir.path().to_path_buf());

    let state = AppState {
        last_camera: Some(Camera::new(LonLat::new(-0.1276, 51.5072), 10.5)),
    };
    assert!(state.save_to(base.clone()).is_none());

    let (loaded, warning) = AppState::load_from(base);
    assert!(warning.is_none());
    assert_eq!(loaded, state);
}

#[test]
fn test_dataset_loads_from_file_path() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let path = dir.path().join("two_points.geojson");
    std::fs::write(
        &path,
        r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [4.8952, 52.3702]},
                    "properties": {"name": "Cafe #001"}
                },
                {
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [4.9041, 52.3676]},
                    "properties": {"name": "Library #002"}
                }
            ]
        }"#,
    )
    .expect("Failed to write dataset");

    let options = GeoJsonOptions::new()
        .with_cluster(true)
        .with_cluster_max_zoom(25)
        .with_cluster_radius(15.0);
    let mut source = GeoJsonSource::from_path("markers", &path, options).expect("load dataset");
    assert_eq!(source.point_total(), 2);

    // At world zoom the two Amsterdam points aggregate into one cluster.
    let features = source.features_at(0.0);
    assert_eq!(features.len(), 1);
    assert_eq!(features[0].point_count(), Some(2));
}
