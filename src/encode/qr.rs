//! QR encoder backed by the `qrcode` crate.
//!
//! `qrcode` produces the module matrix; this module lays it out. The image
//! is exactly `size` pixels wide whenever the matrix plus margin fits, with
//! each module scaled to `size / (modules + 2 * margin)` pixels. If it does
//! not fit, modules fall back to 4 pixels each and the image grows.

use image::{Rgba, RgbaImage};
use qrcode::types::QrError;
use qrcode::{EcLevel, QrCode};
use std::fmt::Write;

use super::{EncodeError, QrEncoder, svg_fill};
use crate::color::Color;
use crate::options::QrErrorLevel;

/// Module size used when the requested size is too small for the symbol.
const FALLBACK_SCALE: f32 = 4.0;

/// Everything the QR encoder needs for one render.
#[derive(Debug, Clone, PartialEq)]
pub struct QrRequest {
    pub data: String,
    /// Target edge length in pixels.
    pub size: u32,
    /// Quiet zone in modules. May be fractional.
    pub margin: f32,
    pub dark: Color,
    pub light: Color,
    pub error_level: QrErrorLevel,
}

/// A square matrix of modules, row-major, true = dark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    pub width: usize,
    pub modules: Vec<bool>,
}

impl QrMatrix {
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        self.modules[y * self.width + x]
    }
}

/// Default [`QrEncoder`].
#[derive(Debug, Clone, Copy, Default)]
pub struct QrCodeEncoder;

fn ec_level(level: QrErrorLevel) -> EcLevel {
    match level {
        QrErrorLevel::L => EcLevel::L,
        QrErrorLevel::M => EcLevel::M,
        QrErrorLevel::Q => EcLevel::Q,
        QrErrorLevel::H => EcLevel::H,
    }
}

/// Encode `data` into a module matrix.
pub fn matrix(data: &str, level: QrErrorLevel) -> Result<QrMatrix, EncodeError> {
    if data.is_empty() {
        return Err(EncodeError::EmptyContent);
    }

    let code = QrCode::with_error_correction_level(data.as_bytes(), ec_level(level)).map_err(
        |e| match e {
            QrError::DataTooLong => EncodeError::DataTooLong { level },
            other => EncodeError::Encoder(format!("QR code generation failed: {}", other)),
        },
    )?;

    let width = code.width();
    let modules = code
        .to_colors()
        .into_iter()
        .map(|c| c == qrcode::Color::Dark)
        .collect();

    Ok(QrMatrix { width, modules })
}

/// Pixel geometry of a rendered QR image.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Geometry {
    /// Pixels per module.
    scale: f32,
    /// Final image edge in pixels.
    image_width: u32,
    /// Quiet zone in pixels.
    margin_px: f32,
}

fn geometry(modules: usize, size: u32, margin: f32) -> Geometry {
    let total = modules as f32 + margin * 2.0;
    let (scale, image_width) = if size as f32 >= total {
        (size as f32 / total, size)
    } else {
        (FALLBACK_SCALE, (total * FALLBACK_SCALE).floor() as u32)
    };

    Geometry {
        scale,
        image_width,
        margin_px: margin * scale,
    }
}

impl QrEncoder for QrCodeEncoder {
    fn render(&self, request: &QrRequest) -> Result<RgbaImage, EncodeError> {
        let qr = matrix(&request.data, request.error_level)?;
        let geo = geometry(qr.width, request.size, request.margin);

        let dark = Rgba([request.dark.r, request.dark.g, request.dark.b, request.dark.a]);
        let light = Rgba([request.light.r, request.light.g, request.light.b, request.light.a]);
        let last = qr.width - 1;
        let inner_end = geo.image_width as f32 - geo.margin_px;

        let img = RgbaImage::from_fn(geo.image_width, geo.image_width, |px, py| {
            let (x, y) = (px as f32, py as f32);
            let inside = x >= geo.margin_px && y >= geo.margin_px && x < inner_end && y < inner_end;
            if !inside {
                return light;
            }

            let qx = (((x - geo.margin_px) / geo.scale) as usize).min(last);
            let qy = (((y - geo.margin_px) / geo.scale) as usize).min(last);
            if qr.is_dark(qx, qy) { dark } else { light }
        });

        Ok(img)
    }

    fn to_svg(&self, request: &QrRequest) -> Result<String, EncodeError> {
        let qr = matrix(&request.data, request.error_level)?;
        let total = qr.width as f32 + request.margin * 2.0;

        // One horizontal stroke per run of dark modules, centred on the row.
        let mut path = String::new();
        for y in 0..qr.width {
            let mut x = 0;
            while x < qr.width {
                if !qr.is_dark(x, y) {
                    x += 1;
                    continue;
                }
                let start = x;
                while x < qr.width && qr.is_dark(x, y) {
                    x += 1;
                }
                let _ = write!(
                    path,
                    "M{} {}h{}",
                    start as f32 + request.margin,
                    y as f32 + request.margin + 0.5,
                    x - start
                );
            }
        }

        let mut svg = String::new();
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{size}\" height=\"{size}\" \
             viewBox=\"0 0 {total} {total}\" shape-rendering=\"crispEdges\">",
            size = request.size,
            total = total,
        );
        if request.light.a > 0 {
            let _ = write!(
                svg,
                "<path {} d=\"M0 0h{total}v{total}H0z\"/>",
                svg_fill(request.light),
                total = total
            );
        }
        let stroke_opacity = if request.dark.a == 0xff {
            String::new()
        } else {
            format!(" stroke-opacity=\"{:.2}\"", request.dark.opacity())
        };
        let _ = write!(
            svg,
            "<path stroke=\"{}\"{} d=\"{}\"/></svg>\n",
            request.dark.to_hex(),
            stroke_opacity,
            path
        );

        Ok(svg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(data: &str) -> QrRequest {
        QrRequest {
            data: data.to_string(),
            size: 300,
            margin: 1.0,
            dark: Color::BLACK,
            light: Color::WHITE,
            error_level: QrErrorLevel::M,
        }
    }

    #[test]
    fn test_matrix_is_square() {
        let qr = matrix("https://example.com", QrErrorLevel::H).unwrap();
        assert_eq!(qr.modules.len(), qr.width * qr.width);
        // Finder pattern corner is dark
        assert!(qr.is_dark(0, 0));
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(
            matrix("", QrErrorLevel::M).unwrap_err(),
            EncodeError::EmptyContent
        );
    }

    #[test]
    fn test_too_long_rejected() {
        let huge = "x".repeat(5000);
        assert_eq!(
            matrix(&huge, QrErrorLevel::H).unwrap_err(),
            EncodeError::DataTooLong {
                level: QrErrorLevel::H
            }
        );
    }

    #[test]
    fn test_render_hits_requested_size() {
        let img = QrCodeEncoder.render(&request("Hello")).unwrap();
        assert_eq!(img.dimensions(), (300, 300));
        // Margin is light, first module inside is the dark finder corner
        assert_eq!(img.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
        let geo = geometry(21, 300, 1.0);
        let inside = geo.margin_px.ceil() as u32 + 1;
        assert_eq!(img.get_pixel(inside, inside), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_render_uses_colors() {
        let req = QrRequest {
            dark: Color::rgb(0x10, 0x20, 0x30),
            light: Color::rgb(0xfe, 0xfd, 0xfc),
            ..request("Hello")
        };
        let img = QrCodeEncoder.render(&req).unwrap();
        assert_eq!(img.get_pixel(0, 0), &Rgba([0xfe, 0xfd, 0xfc, 255]));
        assert!(img.pixels().any(|p| p == &Rgba([0x10, 0x20, 0x30, 255])));
    }

    #[test]
    fn test_zero_margin_starts_dark() {
        let req = QrRequest {
            margin: 0.0,
            ..request("Hello")
        };
        let img = QrCodeEncoder.render(&req).unwrap();
        assert_eq!(img.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_small_size_falls_back_to_fixed_scale() {
        let geo = geometry(177, 150, 5.0);
        assert_eq!(geo.scale, FALLBACK_SCALE);
        assert_eq!(geo.image_width, ((177.0 + 10.0) * 4.0) as u32);
    }

    #[test]
    fn test_svg_document() {
        let svg = QrCodeEncoder.to_svg(&request("Hello")).unwrap();
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.contains("width=\"300\""));
        assert!(svg.contains("viewBox=\"0 0 23 23\""));
        assert!(svg.contains("fill=\"#ffffff\""));
        assert!(svg.contains("stroke=\"#000000\""));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_svg_is_deterministic() {
        let a = QrCodeEncoder.to_svg(&request("same")).unwrap();
        let b = QrCodeEncoder.to_svg(&request("same")).unwrap();
        assert_eq!(a, b);
    }
}
