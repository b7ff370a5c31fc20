// SPDX-License-Identifier: MPL-2.0
//! Bundled application assets.
//!
//! The marker dataset and the icon bitmap ship inside the binary so the
//! viewer works without locating files on disk at runtime.

use rust_embed::RustEmbed;
use std::borrow::Cow;

/// URI of the bundled marker dataset, as referenced by the map source.
pub const POINTS_URI: &str = "asset://points.geojson";

/// Bundle path of the marker icon bitmap.
pub const MARKER_ICON: &str = "icons/marker.png";

#[derive(RustEmbed)]
#[folder = "assets/"]
#[include = "points.geojson"]
#[include = "icons/*"]
pub struct Assets;

/// Returns the raw bytes of a bundled asset, or `None` if the name is
/// not part of the bundle.
pub fn get(name: &str) -> Option<Cow<'static, [u8]>> {
    Assets::get(name).map(|file| file.data)
}
