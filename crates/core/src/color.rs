//! 8-bit RGB draw colors.
//!
//! Dots are drawn with a solid color and a separate alpha, so the palette only
//! needs opaque triples. A color serializes as `[r, g, b]` and deserializes from
//! either that array form or a `"#rrggbb"` hex string.

use crate::error::EngineError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Opaque sRGB color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// The default dot color.
    pub const CYAN: Rgb = Rgb::new(0, 255, 255);

    /// Creates a color from its three 8-bit components.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses a hex color string like "#ff00aa" or "ff00aa" (case insensitive).
    ///
    /// Returns `EngineError::InvalidColor` if the input is not a valid 6-digit hex color.
    pub fn from_hex(hex: &str) -> Result<Rgb, EngineError> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(EngineError::InvalidColor(format!(
                "expected 6 hex digits, got '{hex}'"
            )));
        }
        let component = |range: std::ops::Range<usize>, name: &str| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|e| EngineError::InvalidColor(format!("invalid {name} component: {e}")))
        };
        Ok(Rgb {
            r: component(0..2, "red")?,
            g: component(2..4, "green")?,
            b: component(4..6, "blue")?,
        })
    }

    /// Converts the color to a hex string like `"#rrggbb"`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// CSS `rgba()` fill style for this color at the given alpha.
    ///
    /// Alpha is clamped to [0, 1]; NaN becomes 0.
    pub fn css_rgba(self, alpha: f64) -> String {
        let alpha = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
        format!("rgba({}, {}, {}, {alpha})", self.r, self.g, self.b)
    }

    /// Components as `[r, g, b]`.
    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Rgb { r, g, b }
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_array().serialize(serializer)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RgbRepr {
    Triple([u8; 3]),
    Hex(String),
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RgbRepr::deserialize(deserializer)? {
            RgbRepr::Triple(t) => Ok(Rgb::from(t)),
            RgbRepr::Hex(s) => Rgb::from_hex(&s).map_err(serde::de::Error::custom),
        }
    }
}
