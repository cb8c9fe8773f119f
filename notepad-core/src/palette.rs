//! Choices offered by the editor pickers.

use crate::Color;

/// Background swatches, light greys to brand and accent colors.
pub const BACKGROUND_COLORS: [Color; 20] = [
    Color::rgb(0xff, 0xff, 0xff),
    Color::rgb(0xf8, 0xf9, 0xfa),
    Color::rgb(0xe9, 0xec, 0xef),
    Color::rgb(0xde, 0xe2, 0xe6),
    Color::rgb(0xce, 0xd4, 0xda),
    Color::rgb(0xad, 0xb5, 0xbd),
    Color::rgb(0x6c, 0x75, 0x7d),
    Color::rgb(0x49, 0x50, 0x57),
    Color::rgb(0x34, 0x3a, 0x40),
    Color::rgb(0x21, 0x25, 0x29),
    BRAND_PRIMARY,
    BRAND_SECONDARY,
    Color::rgb(0x6b, 0x46, 0xc1),
    Color::rgb(0x4c, 0x51, 0xbf),
    Color::rgb(0x42, 0x99, 0xe1),
    Color::rgb(0x38, 0xb2, 0xac),
    Color::rgb(0x48, 0xbb, 0x78),
    Color::rgb(0xec, 0xc9, 0x4b),
    Color::rgb(0xed, 0x89, 0x36),
    Color::rgb(0xf5, 0x65, 0x65),
];

/// Text color swatches.
pub const TEXT_COLORS: [Color; 12] = [
    Color::rgb(0x00, 0x00, 0x00),
    Color::rgb(0x2d, 0x37, 0x48),
    Color::rgb(0x4a, 0x55, 0x68),
    Color::rgb(0x71, 0x80, 0x96),
    BRAND_PRIMARY,
    BRAND_SECONDARY,
    Color::rgb(0xf5, 0x65, 0x65),
    Color::rgb(0xed, 0x89, 0x36),
    Color::rgb(0xec, 0xc9, 0x4b),
    Color::rgb(0x48, 0xbb, 0x78),
    Color::rgb(0x38, 0xb2, 0xac),
    Color::rgb(0x42, 0x99, 0xe1),
];

/// Font sizes offered by the effects panel, in pixels.
pub const FONT_SIZES: [u16; 9] = [12, 14, 16, 18, 20, 24, 28, 32, 40];

/// Stickers that can be appended to a note.
pub const STICKERS: [&str; 12] = [
    "😀", "😂", "🥰", "😎", "🌟", "🎉", "❤️", "🔥", "📌", "📍", "🎨", "✏️",
];

/// First stop of the brand gradient.
pub const BRAND_PRIMARY: Color = Color::rgb(0x66, 0x7e, 0xea);
/// Second stop of the brand gradient.
pub const BRAND_SECONDARY: Color = Color::rgb(0x76, 0x4b, 0xa2);
