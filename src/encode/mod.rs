//! # Encoder Collaborators
//!
//! Symbol encoding is delegated to third-party crates behind two traits:
//!
//! | Trait | Default impl | Backing crate |
//! |-------|--------------|---------------|
//! | [`QrEncoder`] | [`QrCodeEncoder`] | `qrcode` |
//! | [`BarcodeEncoder`] | [`BarcodersEncoder`] | `barcoders` |
//!
//! Both take a fully mapped request struct and produce either a bitmap or an
//! SVG document. A request is a plain value: equal requests always produce
//! equal output.

pub mod barcode;
pub mod qr;
pub mod symbology;
mod text;

pub use barcode::{BarcodeRequest, BarcodersEncoder, TextAlign, TextPosition};
pub use qr::{QrCodeEncoder, QrRequest};

use image::RgbaImage;
use thiserror::Error;

use crate::options::{BarcodeFormat, QrErrorLevel};

/// The encoder refused the content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("Nothing to encode: content is empty")]
    EmptyContent,

    #[error("{format} does not accept the character {ch:?}")]
    InvalidCharacter { format: BarcodeFormat, ch: char },

    #[error("{format} expects {expected}, got {actual} characters")]
    InvalidLength {
        format: BarcodeFormat,
        expected: &'static str,
        actual: usize,
    },

    #[error("{format} check digit is {actual}, expected {expected}")]
    CheckDigit {
        format: BarcodeFormat,
        expected: u8,
        actual: u8,
    },

    #[error("{format} value {value} is outside {min}..={max}")]
    OutOfRange {
        format: BarcodeFormat,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("Content is {len} characters long, the limit is {max}")]
    ContentTooLong { len: usize, max: usize },

    #[error("Barcode would be {width}px wide, the limit is {max}px")]
    TooWide { width: u64, max: u32 },

    #[error("Content is too long for a QR code at error level {level}")]
    DataTooLong { level: QrErrorLevel },

    #[error("Encoder failed: {0}")]
    Encoder(String),
}

/// QR encoder collaborator.
pub trait QrEncoder: Send + Sync {
    /// Render to a bitmap exactly as the preview shows it.
    fn render(&self, request: &QrRequest) -> Result<RgbaImage, EncodeError>;

    /// Produce a self-contained SVG document.
    fn to_svg(&self, request: &QrRequest) -> Result<String, EncodeError>;
}

/// Linear barcode encoder collaborator.
pub trait BarcodeEncoder: Send + Sync {
    /// Render to a bitmap exactly as the preview shows it.
    fn render(&self, request: &BarcodeRequest) -> Result<RgbaImage, EncodeError>;

    /// Produce a self-contained SVG document.
    fn to_svg(&self, request: &BarcodeRequest) -> Result<String, EncodeError>;
}

/// Escape text for use inside SVG attributes and text nodes.
pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// `fill="..."` plus `fill-opacity` when the color is translucent.
pub(crate) fn svg_fill(color: crate::color::Color) -> String {
    if color.a == 0xff {
        format!("fill=\"{}\"", color.to_hex())
    } else {
        format!(
            "fill=\"{}\" fill-opacity=\"{:.2}\"",
            color.to_hex(),
            color.opacity()
        )
    }
}
