// SPDX-License-Identifier: MPL-2.0
//! `iced_atlas` is a single-screen map viewer built with the Iced GUI
//! framework.
//!
//! It displays a dark-styled map with point markers loaded from a
//! bundled GeoJSON document. Marker aggregation, filter evaluation and
//! scene assembly live in the embedded [`map`] component; the
//! application merely configures it and forwards lifecycle events.

#![doc(html_root_url = "https://docs.rs/iced_atlas/0.2.0")]

pub mod app;
pub mod assets;
pub mod config;
pub mod error;
pub mod icon;
pub mod map;
pub mod ui;
