//! Color values as the form exchanges them (`#rrggbb` hex strings).
//!
//! Parsing goes through `palette`, which accepts `#rgb`, `#rrggbb` and the
//! same forms without the leading `#`.

use image::Rgba;
use palette::{Mix, Srgb};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An sRGB color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// A color string that is not valid hex.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color '{input}': {reason}")]
pub struct ColorError {
    pub input: String,
    pub reason: String,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color such as `#FFFFFF` or `f0f9ff`.
    pub fn parse(input: &str) -> Result<Self, ColorError> {
        let rgb = Srgb::<u8>::from_str(input.trim()).map_err(|e| ColorError {
            input: input.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::rgb(rgb.red, rgb.green, rgb.blue))
    }

    /// Lowercase `#rrggbb`. Alpha is not part of the hex form.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Alpha as a 0.0..=1.0 opacity.
    pub fn opacity(self) -> f32 {
        self.a as f32 / 255.0
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }

    /// Interpolate in gamma-encoded sRGB, the way CSS gradients do.
    pub fn mix(self, other: Color, t: f32) -> Color {
        let from: Srgb<f32> = Srgb::new(self.r, self.g, self.b).into_format();
        let to: Srgb<f32> = Srgb::new(other.r, other.g, other.b).into_format();
        let mixed: Srgb<u8> = from.mix(to, t.clamp(0.0, 1.0)).into_format();
        let a = self.a as f32 + (other.a as f32 - self.a as f32) * t.clamp(0.0, 1.0);
        Color::rgba(mixed.red, mixed.green, mixed.blue, a.round() as u8)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}
