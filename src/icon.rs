// SPDX-License-Identifier: MPL-2.0
//! Window/application icon loading.
//! Rasterizes the embedded branding SVG at runtime to produce the RGBA
//! icon for the window title bar. Falls back to `None` (the platform
//! default icon) if parsing or rendering fails.

use iced::window::{icon, Icon};
use resvg::usvg;

const ICON_EDGE: u32 = 128;

/// Rasterize the embedded SVG mark to an `ICON_EDGE` square RGBA buffer.
pub fn load_window_icon() -> Option<Icon> {
    // Embed the SVG so packaging does not need to locate assets on disk.
    const SVG_SOURCE: &str = include_str!("../assets/branding/iced_atlas.svg");

    let tree = match usvg::Tree::from_data(SVG_SOURCE.as_bytes(), &usvg::Options::default()) {
        Ok(tree) => tree,
        Err(err) => {
            tracing::debug!(%err, "window icon svg failed to parse");
            return None;
        }
    };

    let size = tree.size();
    let transform = tiny_skia::Transform::from_scale(
        ICON_EDGE as f32 / size.width(),
        ICON_EDGE as f32 / size.height(),
    );

    let mut pixmap = tiny_skia::Pixmap::new(ICON_EDGE, ICON_EDGE)?;
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    icon::from_rgba(pixmap.data().to_vec(), ICON_EDGE, ICON_EDGE).ok()
}
