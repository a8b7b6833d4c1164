//! Linear barcode encoder backed by `barcoders`.
//!
//! Layout, in pixels:
//!
//! ```text
//! ┌──────────────── margin ────────────────┐
//! │  ▌▌ ▌▌▌ ▌ ▌▌  ← bar_height             │
//! │            ← text_margin               │
//! │   1234567890  ← font_size (show_text)  │
//! └──────────────── margin ────────────────┘
//! width  = modules * module_width + 2 * margin
//! height = bar_height + 2 * margin + (font_size + text_margin if show_text)
//! ```
//!
//! Module edges are rounded to whole pixels, so fractional module widths
//! stay crisp.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use super::symbology::{self, Symbol};
use super::text::render_line;
use super::{BarcodeEncoder, EncodeError, escape_xml, svg_fill};
use crate::color::Color;
use crate::options::BarcodeFormat;

/// Horizontal placement of the human-readable text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Vertical placement of the human-readable text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextPosition {
    Top,
    #[default]
    Bottom,
}

/// Everything the barcode encoder needs for one render.
#[derive(Debug, Clone, PartialEq)]
pub struct BarcodeRequest {
    pub data: String,
    pub format: BarcodeFormat,
    /// Width of one module in pixels.
    pub module_width: f32,
    pub bar_height: u32,
    pub show_text: bool,
    pub font_size: u32,
    pub text_align: TextAlign,
    pub text_position: TextPosition,
    /// Gap between bars and text in pixels.
    pub text_margin: u32,
    pub background: Color,
    pub foreground: Color,
    pub margin: u32,
}

/// Widest surface the encoder will allocate, in pixels.
pub const MAX_SURFACE_WIDTH: u32 = 8192;

/// Default [`BarcodeEncoder`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BarcodersEncoder;

/// Resolved pixel layout for one request.
#[derive(Debug, Clone, PartialEq)]
struct Layout {
    width: u32,
    height: u32,
    /// Top of the bars.
    bar_top: u32,
    /// Top of the text line, when shown.
    text_top: Option<u32>,
    /// Filled runs as `(x, width)` in pixels.
    bars: Vec<(u32, u32)>,
}

fn layout(request: &BarcodeRequest, symbol: &Symbol) -> Result<Layout, EncodeError> {
    let mw = request.module_width;

    // Checked in u64 before anything is allocated
    let width =
        (symbol.modules.len() as f64 * mw as f64).round() as u64 + u64::from(request.margin) * 2;
    if width > MAX_SURFACE_WIDTH as u64 {
        return Err(EncodeError::TooWide {
            width,
            max: MAX_SURFACE_WIDTH,
        });
    }

    let edge = |i: usize| (i as f32 * mw).round() as u32;

    let mut bars = Vec::new();
    let mut i = 0;
    while i < symbol.modules.len() {
        if symbol.modules[i] == 0 {
            i += 1;
            continue;
        }
        let start = i;
        while i < symbol.modules.len() && symbol.modules[i] == 1 {
            i += 1;
        }
        let x0 = edge(start);
        bars.push((request.margin + x0, edge(i) - x0));
    }

    let text_block = if request.show_text {
        request.font_size + request.text_margin
    } else {
        0
    };

    let (bar_top, text_top) = match (request.show_text, request.text_position) {
        (false, _) => (request.margin, None),
        (true, TextPosition::Bottom) => (
            request.margin,
            Some(request.margin + request.bar_height + request.text_margin),
        ),
        (true, TextPosition::Top) => (request.margin + text_block, Some(request.margin)),
    };

    Ok(Layout {
        width: edge(symbol.modules.len()) + request.margin * 2,
        height: request.bar_height + request.margin * 2 + text_block,
        bar_top,
        text_top,
        bars,
    })
}

/// X of the text's left edge (bitmap) for a given text width.
fn text_x(request: &BarcodeRequest, layout: &Layout, text_width: u32) -> u32 {
    match request.text_align {
        TextAlign::Left => request.margin,
        TextAlign::Center => layout.width.saturating_sub(text_width) / 2,
        TextAlign::Right => (layout.width - request.margin).saturating_sub(text_width),
    }
}

impl BarcodeEncoder for BarcodersEncoder {
    fn render(&self, request: &BarcodeRequest) -> Result<RgbaImage, EncodeError> {
        let symbol = symbology::encode(request.format, &request.data)?;
        let layout = layout(request, &symbol)?;

        let bg = request.background;
        let fg = Rgba([
            request.foreground.r,
            request.foreground.g,
            request.foreground.b,
            request.foreground.a,
        ]);
        let mut img = RgbaImage::from_pixel(layout.width, layout.height, bg.to_rgba());

        for &(x, w) in &layout.bars {
            for px in x..x + w {
                for py in layout.bar_top..layout.bar_top + request.bar_height {
                    img.put_pixel(px, py, fg);
                }
            }
        }

        if let Some(text_top) = layout.text_top {
            let line = render_line(&symbol.text, request.font_size as usize)?;
            let x0 = text_x(request, &layout, line.width as u32);
            for y in 0..line.height {
                for x in 0..line.width {
                    let (px, py) = (x0 + x as u32, text_top + y as u32);
                    if line.get(x, y) && px < layout.width && py < layout.height {
                        img.put_pixel(px, py, fg);
                    }
                }
            }
        }

        Ok(img)
    }

    fn to_svg(&self, request: &BarcodeRequest) -> Result<String, EncodeError> {
        let symbol = symbology::encode(request.format, &request.data)?;
        let layout = layout(request, &symbol)?;

        let mut svg = String::new();
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"{w}px\" height=\"{h}px\" \
             viewBox=\"0 0 {w} {h}\">",
            w = layout.width,
            h = layout.height
        );
        let _ = write!(
            svg,
            "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" {}/>",
            layout.width,
            layout.height,
            svg_fill(request.background)
        );

        let _ = write!(svg, "<g {}>", svg_fill(request.foreground));
        for &(x, w) in &layout.bars {
            let _ = write!(
                svg,
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"/>",
                x, layout.bar_top, w, request.bar_height
            );
        }

        if let Some(text_top) = layout.text_top {
            let (x, anchor) = match request.text_align {
                TextAlign::Left => (request.margin, "start"),
                TextAlign::Center => (layout.width / 2, "middle"),
                TextAlign::Right => (layout.width - request.margin, "end"),
            };
            let _ = write!(
                svg,
                "<text x=\"{}\" y=\"{}\" text-anchor=\"{}\" font-family=\"monospace\" \
                 font-size=\"{}px\">{}</text>",
                x,
                text_top + request.font_size,
                anchor,
                request.font_size,
                escape_xml(&symbol.text)
            );
        }
        svg.push_str("</g></svg>");

        Ok(svg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(format: BarcodeFormat, data: &str) -> BarcodeRequest {
        BarcodeRequest {
            data: data.to_string(),
            format,
            module_width: 2.0,
            bar_height: 100,
            show_text: true,
            font_size: 20,
            text_align: TextAlign::Center,
            text_position: TextPosition::Bottom,
            text_margin: 2,
            background: Color::WHITE,
            foreground: Color::BLACK,
            margin: 10,
        }
    }

    #[test]
    fn test_dimensions_with_text() {
        let req = request(BarcodeFormat::Ean13, "123456789012");
        let img = BarcodersEncoder.render(&req).unwrap();
        assert_eq!(img.width(), 95 * 2 + 20);
        assert_eq!(img.height(), 100 + 20 + 20 + 2);
    }

    #[test]
    fn test_dimensions_without_text() {
        let req = BarcodeRequest {
            show_text: false,
            ..request(BarcodeFormat::Ean13, "123456789012")
        };
        let img = BarcodersEncoder.render(&req).unwrap();
        assert_eq!(img.height(), 120);
    }

    #[test]
    fn test_margin_is_background() {
        let req = BarcodeRequest {
            background: Color::rgb(0xee, 0xee, 0xee),
            ..request(BarcodeFormat::Code128, "ABC")
        };
        let img = BarcodersEncoder.render(&req).unwrap();
        assert_eq!(img.get_pixel(0, 0), &Rgba([0xee, 0xee, 0xee, 255]));
        // Code 128 starts with a bar
        assert_eq!(img.get_pixel(10, 50), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_fractional_module_width() {
        let req = BarcodeRequest {
            module_width: 1.5,
            show_text: false,
            ..request(BarcodeFormat::Ean8, "9638507")
        };
        let img = BarcodersEncoder.render(&req).unwrap();
        assert_eq!(img.width(), (67.0f32 * 1.5).round() as u32 + 20);
    }

    #[test]
    fn test_text_on_top_moves_bars_down() {
        let req = BarcodeRequest {
            text_position: TextPosition::Top,
            ..request(BarcodeFormat::Code128, "ABC")
        };
        let symbol = symbology::encode(req.format, &req.data).unwrap();
        let l = layout(&req, &symbol).unwrap();
        assert_eq!(l.text_top, Some(10));
        assert_eq!(l.bar_top, 10 + 20 + 2);
    }

    #[test]
    fn test_rejection_passes_through() {
        let err = BarcodersEncoder
            .render(&request(BarcodeFormat::Ean13, "12345"))
            .unwrap_err();
        assert!(matches!(err, EncodeError::InvalidLength { .. }));
        assert!(BarcodersEncoder
            .to_svg(&request(BarcodeFormat::Ean13, "12345"))
            .is_err());
    }

    #[test]
    fn test_svg_contains_bars_and_text() {
        let svg = BarcodersEncoder
            .to_svg(&request(BarcodeFormat::Code39, "A&B"))
            .unwrap_err();
        // '&' is not Code 39
        assert!(matches!(svg, EncodeError::InvalidCharacter { ch: '&', .. }));

        let svg = BarcodersEncoder
            .to_svg(&request(BarcodeFormat::Code128, "A&B"))
            .unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("<rect x=\"10\""));
        assert!(svg.contains(">A&amp;B</text>"));
        assert!(svg.ends_with("</g></svg>"));
    }

    #[test]
    fn test_too_wide_is_rejected_before_allocating() {
        // 500 chars of set B at 5px per module is far past the limit
        let req = BarcodeRequest {
            module_width: 5.0,
            bar_height: 200,
            ..request(BarcodeFormat::Code128, &"x".repeat(500))
        };
        let symbol = symbology::encode(req.format, &req.data).unwrap();
        let err = layout(&req, &symbol).unwrap_err();
        assert!(matches!(err, EncodeError::TooWide { max: MAX_SURFACE_WIDTH, .. }));
        assert_eq!(BarcodersEncoder.render(&req).unwrap_err(), err);
        assert_eq!(BarcodersEncoder.to_svg(&req).unwrap_err(), err);
    }

    #[test]
    fn test_narrow_symbol_layout_width() {
        let req = BarcodeRequest {
            module_width: 1.0,
            margin: 0,
            show_text: false,
            ..request(BarcodeFormat::Msi, "1")
        };
        let symbol = symbology::encode(req.format, &req.data).unwrap();
        assert_eq!(layout(&req, &symbol).unwrap().width, 19);
    }

    #[test]
    fn test_svg_without_text() {
        let req = BarcodeRequest {
            show_text: false,
            ..request(BarcodeFormat::Msi, "1234")
        };
        let svg = BarcodersEncoder.to_svg(&req).unwrap();
        assert!(!svg.contains("<text"));
    }
}
