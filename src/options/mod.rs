//! # Option State Store
//!
//! [`RenderOptions`] is the single owned record of everything the user can
//! adjust. It is only changed through [`reduce`], one [`Action`] at a time.
//!
//! Field names serialize in camelCase so the browser form and option files
//! use the same keys (`codeType`, `qrSize`, `backgroundColor`, ...).

mod action;

pub use action::{Action, reduce};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

use crate::color::Color;

/// Content a fresh QR session starts with, and the reset target when
/// switching to QR.
pub const QR_DEFAULT_CONTENT: &str = "Hello World! QR Code Generator";

/// Reset target when switching to barcode.
pub const BARCODE_DEFAULT_CONTENT: &str = "1234567890";

/// Bounds of the numeric fields, as the form exposes them.
pub mod bounds {
    use std::ops::RangeInclusive;

    pub const WIDTH: RangeInclusive<f32> = 1.0..=5.0;
    /// Module width moves in half-module steps.
    pub const WIDTH_STEP: f32 = 0.5;
    pub const HEIGHT: RangeInclusive<u32> = 50..=200;
    pub const QR_SIZE: RangeInclusive<u32> = 150..=500;
    pub const MARGIN: RangeInclusive<u32> = 0..=50;
    pub const FONT_SIZE: RangeInclusive<u32> = 10..=30;
    pub const BORDER_RADIUS: RangeInclusive<u32> = 0..=20;
    pub const GRADIENT_DIRECTION: RangeInclusive<u32> = 0..=360;
}

/// Which encoder to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CodeType {
    #[default]
    #[serde(rename = "QR")]
    Qr,
    #[serde(rename = "BARCODE")]
    Barcode,
}

impl CodeType {
    /// Content the store resets to when switching to this type.
    pub fn default_content(self) -> &'static str {
        match self {
            CodeType::Qr => QR_DEFAULT_CONTENT,
            CodeType::Barcode => BARCODE_DEFAULT_CONTENT,
        }
    }

    /// Prefix used in export filenames.
    pub fn file_prefix(self) -> &'static str {
        match self {
            CodeType::Qr => "qrcode",
            CodeType::Barcode => "barcode",
        }
    }

    /// Parse a type name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "qr" | "qrcode" => Some(CodeType::Qr),
            "barcode" => Some(CodeType::Barcode),
            _ => None,
        }
    }
}

impl fmt::Display for CodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeType::Qr => f.write_str("QR"),
            CodeType::Barcode => f.write_str("BARCODE"),
        }
    }
}

/// Linear barcode symbologies offered by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BarcodeFormat {
    #[default]
    #[serde(rename = "CODE128")]
    Code128,
    #[serde(rename = "CODE39")]
    Code39,
    #[serde(rename = "EAN13")]
    Ean13,
    #[serde(rename = "EAN8")]
    Ean8,
    #[serde(rename = "UPC")]
    Upc,
    #[serde(rename = "ITF14")]
    Itf14,
    #[serde(rename = "MSI")]
    Msi,
    #[serde(rename = "pharmacode")]
    Pharmacode,
    #[serde(rename = "codabar")]
    Codabar,
}

impl BarcodeFormat {
    pub const ALL: [BarcodeFormat; 9] = [
        BarcodeFormat::Code128,
        BarcodeFormat::Code39,
        BarcodeFormat::Ean13,
        BarcodeFormat::Ean8,
        BarcodeFormat::Upc,
        BarcodeFormat::Itf14,
        BarcodeFormat::Msi,
        BarcodeFormat::Pharmacode,
        BarcodeFormat::Codabar,
    ];

    /// The name used on the wire and in the form.
    pub fn name(self) -> &'static str {
        match self {
            BarcodeFormat::Code128 => "CODE128",
            BarcodeFormat::Code39 => "CODE39",
            BarcodeFormat::Ean13 => "EAN13",
            BarcodeFormat::Ean8 => "EAN8",
            BarcodeFormat::Upc => "UPC",
            BarcodeFormat::Itf14 => "ITF14",
            BarcodeFormat::Msi => "MSI",
            BarcodeFormat::Pharmacode => "pharmacode",
            BarcodeFormat::Codabar => "codabar",
        }
    }

    /// One-line description shown next to the format picker.
    pub fn description(self) -> &'static str {
        match self {
            BarcodeFormat::Code128 => "General purpose text and numbers",
            BarcodeFormat::Code39 => "Industry and inventory",
            BarcodeFormat::Ean13 => "Retail products (13 digits)",
            BarcodeFormat::Ean8 => "Small retail products (8 digits)",
            BarcodeFormat::Upc => "Retail, North America (12 digits)",
            BarcodeFormat::Itf14 => "Distribution and packaging (14 digits)",
            BarcodeFormat::Msi => "Inventory and warehouse shelving",
            BarcodeFormat::Pharmacode => "Pharmaceutical packaging",
            BarcodeFormat::Codabar => "Libraries and blood banks",
        }
    }

    /// Parse a format name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// QR error correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QrErrorLevel {
    /// ~7% recovery
    L,
    /// ~15% recovery
    #[default]
    M,
    /// ~25% recovery
    Q,
    /// ~30% recovery
    H,
}

impl QrErrorLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" => Some(QrErrorLevel::L),
            "M" => Some(QrErrorLevel::M),
            "Q" => Some(QrErrorLevel::Q),
            "H" => Some(QrErrorLevel::H),
            _ => None,
        }
    }
}

impl fmt::Display for QrErrorLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QrErrorLevel::L => "L",
            QrErrorLevel::M => "M",
            QrErrorLevel::Q => "Q",
            QrErrorLevel::H => "H",
        };
        f.write_str(s)
    }
}

/// How the preview container behind the symbol is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundType {
    #[default]
    Solid,
    Gradient,
    Pattern,
}

/// Decorative pattern for `BackgroundType::Pattern`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pattern {
    #[default]
    Dots,
    Grid,
    Stripes,
}

/// Every user-adjustable parameter of the configurator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    /// Data to encode. Empty is valid but renders nothing.
    pub content: String,
    pub code_type: CodeType,
    /// Only used when `code_type` is `Barcode`.
    pub barcode_format: BarcodeFormat,
    /// Only used when `code_type` is `Qr`.
    pub qr_error_level: QrErrorLevel,
    /// Barcode module width in pixels.
    pub width: f32,
    /// Barcode bar height in pixels.
    pub height: u32,
    /// QR edge length in pixels.
    pub qr_size: u32,
    /// Margin in pixels. The QR encoder takes it in tenths (modules).
    pub margin: u32,
    pub font_size: u32,
    pub border_radius: u32,
    pub background_type: BackgroundType,
    pub background_color: Color,
    pub gradient_color1: Color,
    pub gradient_color2: Color,
    /// Gradient angle in CSS degrees (0 = to top, 90 = to right).
    pub gradient_direction: u32,
    pub pattern: Pattern,
    /// Foreground (bars, dark modules).
    pub line_color: Color,
    pub shadow: bool,
    /// Print the human-readable text under a barcode.
    pub display_value: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            content: QR_DEFAULT_CONTENT.to_string(),
            code_type: CodeType::Qr,
            barcode_format: BarcodeFormat::Code128,
            qr_error_level: QrErrorLevel::M,
            width: 2.0,
            height: 100,
            qr_size: 300,
            margin: 10,
            font_size: 20,
            border_radius: 0,
            background_type: BackgroundType::Solid,
            background_color: Color::WHITE,
            gradient_color1: Color::WHITE,
            gradient_color2: Color::rgb(0xf0, 0xf9, 0xff),
            gradient_direction: 45,
            pattern: Pattern::Dots,
            line_color: Color::BLACK,
            shadow: false,
            display_value: true,
        }
    }
}

impl RenderOptions {
    /// True when every numeric field is inside its form bounds.
    pub fn in_bounds(&self) -> bool {
        bounds::WIDTH.contains(&self.width)
            && bounds::HEIGHT.contains(&self.height)
            && bounds::QR_SIZE.contains(&self.qr_size)
            && bounds::MARGIN.contains(&self.margin)
            && bounds::FONT_SIZE.contains(&self.font_size)
            && bounds::BORDER_RADIUS.contains(&self.border_radius)
            && bounds::GRADIENT_DIRECTION.contains(&self.gradient_direction)
    }

    /// Pull every numeric field into its bounds.
    ///
    /// Used wherever options arrive from outside the form (HTTP bodies,
    /// option files), where the form's own input limits don't apply.
    pub fn clamped(mut self) -> Self {
        self.width = clamp_width(self.width);
        self.height = clamp(self.height, bounds::HEIGHT);
        self.qr_size = clamp(self.qr_size, bounds::QR_SIZE);
        self.margin = clamp(self.margin, bounds::MARGIN);
        self.font_size = clamp(self.font_size, bounds::FONT_SIZE);
        self.border_radius = clamp(self.border_radius, bounds::BORDER_RADIUS);
        self.gradient_direction = clamp(self.gradient_direction, bounds::GRADIENT_DIRECTION);
        self
    }

    /// Background color handed to the encoders.
    ///
    /// Gradient and pattern backgrounds are painted by the container behind
    /// the symbol, so the symbol itself gets plain white.
    pub fn encoder_background(&self) -> Color {
        match self.background_type {
            BackgroundType::Solid => self.background_color,
            BackgroundType::Gradient | BackgroundType::Pattern => Color::WHITE,
        }
    }
}

pub(crate) fn clamp(value: u32, range: RangeInclusive<u32>) -> u32 {
    value.clamp(*range.start(), *range.end())
}

/// Clamp and snap to the nearest half module.
pub(crate) fn clamp_width(value: f32) -> f32 {
    if !value.is_finite() {
        return *bounds::WIDTH.start();
    }
    let snapped = (value / bounds::WIDTH_STEP).round() * bounds::WIDTH_STEP;
    snapped.clamp(*bounds::WIDTH.start(), *bounds::WIDTH.end())
}
