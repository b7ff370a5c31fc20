// SPDX-License-Identifier: MPL-2.0
//! Shared UI colors.

use iced::Color;

pub fn toast_background() -> Color {
    Color::from_rgba8(0x20, 0x26, 0x31, 0.95)
}

pub fn toast_text() -> Color {
    Color::from_rgb8(0xec, 0xef, 0xf4)
}

pub fn success_color() -> Color {
    Color::from_rgb8(0x4c, 0xaf, 0x50)
}

pub fn info_color() -> Color {
    Color::from_rgb8(0x42, 0xa5, 0xf5)
}

pub fn warning_color() -> Color {
    Color::from_rgb8(0xff, 0xa7, 0x26)
}

pub fn error_color() -> Color {
    Color::from_rgb8(0xef, 0x53, 0x50)
}
