//! Text and background style of a note.
//!
//! [`StyleAttributes`] is a closed set of optional attributes. Unset
//! attributes resolve to the editor defaults, and updates arrive as partial
//! patches applied with [`StyleAttributes::merge`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{NoteError, NoteResult};

/// Default font size in pixels.
pub const DEFAULT_FONT_SIZE: f32 = 20.0;
/// Default line height multiplier.
pub const DEFAULT_LINE_HEIGHT: f32 = 1.6;
/// Default font family stack.
pub const DEFAULT_FONT_FAMILY: &str =
    "-apple-system, BlinkMacSystemFont, \"Segoe UI\", Roboto, sans-serif";

/// An sRGB color with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 = opaque).
    pub a: u8,
}

impl Color {
    /// Opaque white, the default note background.
    pub const WHITE: Self = Self::rgb(0xff, 0xff, 0xff);
    /// Opaque black, the default text color.
    pub const BLACK: Self = Self::rgb(0x00, 0x00, 0x00);

    /// Create an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a hex color.
    pub fn from_hex(input: &str) -> NoteResult<Self> {
        let invalid = || NoteError::InvalidColor(input.to_string());
        let hex = input.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (slot, c) in out.iter_mut().zip(hex.chars()) {
                    let v = channel(&c.to_string())?;
                    *slot = v * 17;
                }
                Ok(Self::rgb(out[0], out[1], out[2]))
            }
            6 | 8 => {
                let r = channel(&hex[0..2])?;
                let g = channel(&hex[2..4])?;
                let b = channel(&hex[4..6])?;
                let a = if hex.len() == 8 {
                    channel(&hex[6..8])?
                } else {
                    255
                };
                Ok(Self { r, g, b, a })
            }
            _ => Err(invalid()),
        }
    }

    /// Whether the color is fully opaque.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if !self.is_opaque() {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl FromStr for Color {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = NoteError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// CSS keyword for this value.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = NoteError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(NoteError::InvalidValue {
                        field: $field,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

named_enum! {
    /// Font weight.
    FontWeight, "font weight" {
        /// Regular weight.
        Normal => "normal",
        /// Bold weight.
        Bold => "bold",
    }
}

named_enum! {
    /// Font slant.
    FontStyle, "font style" {
        /// Upright.
        Normal => "normal",
        /// Italic.
        Italic => "italic",
    }
}

named_enum! {
    /// Text decoration line.
    TextDecoration, "text decoration" {
        /// No decoration.
        None => "none",
        /// Underlined text.
        Underline => "underline",
    }
}

named_enum! {
    /// Horizontal text alignment.
    TextAlign, "text alignment" {
        /// Flush left.
        Left => "left",
        /// Centered.
        Center => "center",
        /// Flush right.
        Right => "right",
    }
}

/// Visual attributes of the note text and its background.
///
/// Every field is optional; `None` means "use the default". The same type
/// serves as the full style snapshot and as a partial patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleAttributes {
    /// Font size in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    /// Font weight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    /// Font slant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_style: Option<FontStyle>,
    /// Underline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<TextDecoration>,
    /// Text color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Background color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
    /// Text alignment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    /// Font family stack.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Line height multiplier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f32>,
}

impl StyleAttributes {
    /// Create an empty attribute set (every attribute at its default).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay `patch` onto `self`: attributes set in the patch win, the rest
    /// keep their current value.
    pub fn merge(&mut self, patch: &StyleAttributes) {
        fn overlay<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
            if let Some(v) = value {
                *slot = Some(v.clone());
            }
        }

        overlay(&mut self.font_size, &patch.font_size);
        overlay(&mut self.font_weight, &patch.font_weight);
        overlay(&mut self.font_style, &patch.font_style);
        overlay(&mut self.text_decoration, &patch.text_decoration);
        overlay(&mut self.color, &patch.color);
        overlay(&mut self.background_color, &patch.background_color);
        overlay(&mut self.text_align, &patch.text_align);
        overlay(&mut self.font_family, &patch.font_family);
        overlay(&mut self.line_height, &patch.line_height);
    }

    /// Return a copy of `self` with `patch` merged in.
    #[must_use]
    pub fn merged(&self, patch: &StyleAttributes) -> Self {
        let mut out = self.clone();
        out.merge(patch);
        out
    }

    /// Parse attributes from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is invalid.
    pub fn from_json(json: &str) -> NoteResult<Self> {
        serde_json::from_str(json).map_err(NoteError::Serialization)
    }

    /// Serialize the attributes that are set.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> NoteResult<String> {
        serde_json::to_string(self).map_err(NoteError::Serialization)
    }

    // Resolved values

    /// Font size in pixels.
    #[must_use]
    pub fn resolved_font_size(&self) -> f32 {
        self.font_size.unwrap_or(DEFAULT_FONT_SIZE)
    }

    /// Font weight.
    #[must_use]
    pub fn resolved_font_weight(&self) -> FontWeight {
        self.font_weight.unwrap_or(FontWeight::Normal)
    }

    /// Font slant.
    #[must_use]
    pub fn resolved_font_style(&self) -> FontStyle {
        self.font_style.unwrap_or(FontStyle::Normal)
    }

    /// Text decoration.
    #[must_use]
    pub fn resolved_text_decoration(&self) -> TextDecoration {
        self.text_decoration.unwrap_or(TextDecoration::None)
    }

    /// Text color.
    #[must_use]
    pub fn resolved_color(&self) -> Color {
        self.color.unwrap_or(Color::BLACK)
    }

    /// Background color.
    #[must_use]
    pub fn resolved_background(&self) -> Color {
        self.background_color.unwrap_or(Color::WHITE)
    }

    /// Text alignment.
    #[must_use]
    pub fn resolved_text_align(&self) -> TextAlign {
        self.text_align.unwrap_or(TextAlign::Center)
    }

    /// Font family stack.
    #[must_use]
    pub fn resolved_font_family(&self) -> &str {
        self.font_family.as_deref().unwrap_or(DEFAULT_FONT_FAMILY)
    }

    /// Line height multiplier.
    #[must_use]
    pub fn resolved_line_height(&self) -> f32 {
        self.line_height.unwrap_or(DEFAULT_LINE_HEIGHT)
    }

    /// Whether the background is still the default white.
    #[must_use]
    pub fn has_default_background(&self) -> bool {
        self.resolved_background() == Color::WHITE
    }

    // Patch builders

    /// Patch setting the font size.
    #[must_use]
    pub fn font_size(px: f32) -> Self {
        Self {
            font_size: Some(px),
            ..Self::default()
        }
    }

    /// Patch setting the text color.
    #[must_use]
    pub fn color(color: Color) -> Self {
        Self {
            color: Some(color),
            ..Self::default()
        }
    }

    /// Patch setting the background color.
    #[must_use]
    pub fn background(color: Color) -> Self {
        Self {
            background_color: Some(color),
            ..Self::default()
        }
    }

    /// Patch setting the alignment.
    #[must_use]
    pub fn align(align: TextAlign) -> Self {
        Self {
            text_align: Some(align),
            ..Self::default()
        }
    }

    /// Patch flipping bold relative to `self`.
    #[must_use]
    pub fn bold_toggle(&self) -> Self {
        let next = match self.resolved_font_weight() {
            FontWeight::Bold => FontWeight::Normal,
            FontWeight::Normal => FontWeight::Bold,
        };
        Self {
            font_weight: Some(next),
            ..Self::default()
        }
    }

    /// Patch flipping italic relative to `self`.
    #[must_use]
    pub fn italic_toggle(&self) -> Self {
        let next = match self.resolved_font_style() {
            FontStyle::Italic => FontStyle::Normal,
            FontStyle::Normal => FontStyle::Italic,
        };
        Self {
            font_style: Some(next),
            ..Self::default()
        }
    }

    /// Patch flipping underline relative to `self`.
    #[must_use]
    pub fn underline_toggle(&self) -> Self {
        let next = match self.resolved_text_decoration() {
            TextDecoration::Underline => TextDecoration::None,
            TextDecoration::None => TextDecoration::Underline,
        };
        Self {
            text_decoration: Some(next),
            ..Self::default()
        }
    }
}
