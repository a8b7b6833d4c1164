//! Human-readable text under barcodes.
//!
//! Uses the Spleen bitmap font family, picking the smallest source size that
//! is at least as tall as the target and scaling with nearest neighbour.

use spleen_font::{FONT_6X12, FONT_8X16, FONT_12X24, PSF2Font};

use super::EncodeError;

/// A rendered line of text, one `bool` per pixel (true = ink).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBitmap {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<bool>,
}

impl TextBitmap {
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.pixels[y * self.width + x]
    }
}

/// Source font for a target pixel height.
fn source_font(pixel_height: usize) -> (&'static [u8], usize, usize) {
    match pixel_height {
        0..=12 => (FONT_6X12, 6, 12),
        13..=16 => (FONT_8X16, 8, 16),
        _ => (FONT_12X24, 12, 24),
    }
}

/// Render `text` as a single monospace line `pixel_height` pixels tall.
///
/// Glyphs keep the 1:2 Spleen aspect ratio, so each character is
/// `pixel_height / 2` wide.
pub fn render_line(text: &str, pixel_height: usize) -> Result<TextBitmap, EncodeError> {
    let pixel_height = pixel_height.max(1);
    let char_width = (pixel_height / 2).max(1);
    let char_count = text.chars().count();

    let (data, src_w, src_h) = source_font(pixel_height);
    let mut font = PSF2Font::new(data)
        .map_err(|_| EncodeError::Encoder("bundled Spleen font failed to load".to_string()))?;

    let width = char_width * char_count;
    let mut pixels = vec![false; width * pixel_height];
    let mut src_bitmap = vec![false; src_w * src_h];
    let mut scaled = vec![false; char_width * pixel_height];

    for (i, ch) in text.chars().enumerate() {
        src_bitmap.iter_mut().for_each(|p| *p = false);
        let utf8 = ch.to_string();

        match font.glyph_for_utf8(utf8.as_bytes()) {
            Some(glyph) => {
                for (row_y, row) in glyph.enumerate() {
                    for (col_x, on) in row.enumerate() {
                        if row_y < src_h && col_x < src_w {
                            src_bitmap[row_y * src_w + col_x] = on;
                        }
                    }
                }
            }
            // Fallback: draw a box for unknown chars
            None => draw_box(&mut src_bitmap, src_w, src_h),
        }

        scale_bitmap(&src_bitmap, src_w, src_h, &mut scaled, char_width, pixel_height);

        let x0 = i * char_width;
        for y in 0..pixel_height {
            for x in 0..char_width {
                pixels[y * width + x0 + x] = scaled[y * char_width + x];
            }
        }
    }

    Ok(TextBitmap {
        width,
        height: pixel_height,
        pixels,
    })
}

/// Scale a bitmap from src dimensions to dst dimensions using nearest neighbor.
fn scale_bitmap(
    src: &[bool],
    src_w: usize,
    src_h: usize,
    dst: &mut [bool],
    dst_w: usize,
    dst_h: usize,
) {
    for dy in 0..dst_h {
        for dx in 0..dst_w {
            let sx = dx * src_w / dst_w;
            let sy = dy * src_h / dst_h;
            dst[dy * dst_w + dx] = src[sy * src_w + sx];
        }
    }
}

/// Draw a box outline in the glyph buffer.
fn draw_box(glyph: &mut [bool], width: usize, height: usize) {
    for x in 0..width {
        glyph[x] = true;
        glyph[(height - 1) * width + x] = true;
    }
    for y in 0..height {
        glyph[y * width] = true;
        glyph[y * width + width - 1] = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_dimensions() {
        let line = render_line("1234", 20).unwrap();
        assert_eq!(line.height, 20);
        assert_eq!(line.width, 4 * 10);
        assert!(line.pixels.iter().any(|&p| p));
    }

    #[test]
    fn test_empty_line() {
        let line = render_line("", 20).unwrap();
        assert_eq!(line.width, 0);
        assert!(line.pixels.is_empty());
    }

    #[test]
    fn test_space_is_blank() {
        let line = render_line(" ", 24).unwrap();
        assert!(line.pixels.iter().all(|&p| !p));
    }

    #[test]
    fn test_small_sizes_use_small_font() {
        assert_eq!(source_font(10).1, 6);
        assert_eq!(source_font(16).1, 8);
        assert_eq!(source_font(30).1, 12);
    }
}
