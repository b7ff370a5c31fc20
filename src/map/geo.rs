// SPDX-License-Identifier: MPL-2.0
//! Geographic coordinates and the spherical Web-Mercator projection.

use serde::{Deserialize, Serialize};

/// Square tile edge length in pixels; the unit of the world coordinate
/// system at zoom 0.
pub const TILE_SIZE: u32 = 256;

/// Latitudes beyond this cannot be represented in Web Mercator.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

/// A longitude/latitude pair in degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Clamps the latitude into the projectable range and wraps the
    /// longitude into [-180, 180].
    pub fn wrapped(self) -> Self {
        let mut lon = self.lon;
        while lon > 180.0 {
            lon -= 360.0;
        }
        while lon < -180.0 {
            lon += 360.0;
        }
        Self {
            lon,
            lat: self.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE),
        }
    }

    /// Projects to world pixel coordinates at the given zoom level.
    /// The world spans `[0, world_size(zoom))` on both axes with the
    /// origin at the north-west corner.
    pub fn project(&self, zoom: f64) -> (f64, f64) {
        let size = world_size(zoom);
        let clamped = self.wrapped();
        let x = (clamped.lon + 180.0) / 360.0 * size;
        let lat_rad = clamped.lat.to_radians();
        let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0
            * size;
        (x, y)
    }

    /// Inverse of [`LonLat::project`].
    pub fn unproject(x: f64, y: f64, zoom: f64) -> Self {
        let size = world_size(zoom);
        let lon = x / size * 360.0 - 180.0;
        let n = std::f64::consts::PI * (1.0 - 2.0 * y / size);
        let lat = n.sinh().atan().to_degrees();
        Self { lon, lat }.wrapped()
    }
}

/// Edge length of the square world in pixels at a (fractional) zoom.
pub fn world_size(zoom: f64) -> f64 {
    f64::from(TILE_SIZE) * 2f64.powf(zoom)
}
