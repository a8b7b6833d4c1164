//! Rasterizer for the styled preview container.
//!
//! The container is what the preview shows around the symbol: a padded box
//! with its own background, optional rounded corners and an optional drop
//! shadow. Drawing order:
//!
//! 1. canvas filled with the export background color
//! 2. drop shadow (blurred, offset, translucent)
//! 3. container background, clipped to the rounded rectangle
//! 4. the symbol, centred, scaled with nearest neighbour
//!
//! All lengths are CSS pixels multiplied by `scale`.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, Pixel, RgbaImage};

use crate::color::Color;
use crate::options::{BackgroundType, Pattern, RenderOptions};

/// Padding between container edge and symbol, in CSS pixels.
pub const CONTAINER_PADDING: u32 = 32;

/// Drop shadow: `0 10px 30px rgba(0,0,0,0.15)`.
const SHADOW_OFFSET_Y: u32 = 10;
const SHADOW_BLUR: u32 = 30;
const SHADOW_COLOR: Color = Color::rgba(0, 0, 0, 38);

/// Ink for decorative patterns, drawn over the base color.
const PATTERN_INK: Color = Color::rgba(0, 0, 0, 20);
/// Pattern cell size in CSS pixels.
const PATTERN_CELL: u32 = 20;

/// Container background.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Background {
    Solid(Color),
    /// CSS `linear-gradient(<angle>deg, from, to)`.
    Gradient { angle: f32, from: Color, to: Color },
    Pattern { base: Color, pattern: Pattern },
}

impl Background {
    /// Color at `(x, y)` inside a `w` x `h` box, in unscaled CSS pixels.
    fn color_at(&self, x: f32, y: f32, w: f32, h: f32) -> Color {
        match *self {
            Background::Solid(c) => c,
            Background::Gradient { angle, from, to } => {
                // 0deg points up, 90deg points right.
                let rad = angle.to_radians();
                let (dx, dy) = (rad.sin(), -rad.cos());
                let length = (w * dx).abs() + (h * dy).abs();
                let t = if length > 0.0 {
                    ((x - w / 2.0) * dx + (y - h / 2.0) * dy) / length + 0.5
                } else {
                    0.0
                };
                from.mix(to, t)
            }
            Background::Pattern { base, pattern } => {
                if pattern_ink(pattern, x, y) {
                    over(base, PATTERN_INK)
                } else {
                    base
                }
            }
        }
    }
}

fn pattern_ink(pattern: Pattern, x: f32, y: f32) -> bool {
    let cell = PATTERN_CELL as f32;
    let (cx, cy) = (x.rem_euclid(cell), y.rem_euclid(cell));
    match pattern {
        Pattern::Dots => {
            let (dx, dy) = (cx - cell / 2.0, cy - cell / 2.0);
            dx * dx + dy * dy <= 4.0
        }
        Pattern::Grid => cx < 1.0 || cy < 1.0,
        Pattern::Stripes => (x + y).rem_euclid(cell) < cell / 4.0,
    }
}

/// Straight-alpha "source over" for two colors.
fn over(dst: Color, src: Color) -> Color {
    let mut px = dst.to_rgba();
    px.blend(&src.to_rgba());
    Color::rgba(px[0], px[1], px[2], px[3])
}

/// Everything the rasterizer needs to paint the container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyledContainer {
    pub background: Background,
    pub border_radius: u32,
    pub shadow: bool,
    pub padding: u32,
}

impl StyledContainer {
    pub fn from_options(options: &RenderOptions) -> Self {
        let background = match options.background_type {
            BackgroundType::Solid => Background::Solid(options.background_color),
            BackgroundType::Gradient => Background::Gradient {
                angle: options.gradient_direction as f32,
                from: options.gradient_color1,
                to: options.gradient_color2,
            },
            BackgroundType::Pattern => Background::Pattern {
                base: options.background_color,
                pattern: options.pattern,
            },
        };

        Self {
            background,
            border_radius: options.border_radius,
            shadow: options.shadow,
            padding: CONTAINER_PADDING,
        }
    }
}

/// True when `(x, y)` lies inside a `w` x `h` rectangle with corner radius `r`.
fn inside_rounded(x: f32, y: f32, w: f32, h: f32, r: f32) -> bool {
    if x < 0.0 || y < 0.0 || x >= w || y >= h {
        return false;
    }
    if r <= 0.0 {
        return true;
    }
    let cx = if x < r {
        r
    } else if x > w - r {
        w - r
    } else {
        return true;
    };
    let cy = if y < r {
        r
    } else if y > h - r {
        h - r
    } else {
        return true;
    };
    let (dx, dy) = (x - cx, y - cy);
    dx * dx + dy * dy <= r * r
}

/// Paint `container` around `symbol` and return the composed image.
///
/// `canvas_background` fills everything outside the container (the corners
/// cut by the radius and the shadow margin).
pub fn rasterize(
    container: &StyledContainer,
    symbol: &RgbaImage,
    canvas_background: Color,
    scale: u32,
) -> RgbaImage {
    let scale = scale.max(1);
    let sf = scale as f32;

    // Container box in CSS pixels
    let box_w = symbol.width() + container.padding * 2;
    let box_h = symbol.height() + container.padding * 2;

    // Room for the shadow around the box
    let (pad_x, pad_top, pad_bottom) = if container.shadow {
        (SHADOW_BLUR, SHADOW_BLUR, SHADOW_BLUR + SHADOW_OFFSET_Y)
    } else {
        (0, 0, 0)
    };

    let canvas_w = (box_w + pad_x * 2) * scale;
    let canvas_h = (box_h + pad_top + pad_bottom) * scale;
    let mut canvas = RgbaImage::from_pixel(canvas_w, canvas_h, canvas_background.to_rgba());

    let origin_x = (pad_x * scale) as f32;
    let origin_y = (pad_top * scale) as f32;
    let (bw, bh) = ((box_w * scale) as f32, (box_h * scale) as f32);
    let radius = (container.border_radius * scale) as f32;

    if container.shadow {
        let mut mask = GrayImage::new(canvas_w, canvas_h);
        let shadow_y = origin_y + (SHADOW_OFFSET_Y * scale) as f32;
        for (x, y, px) in mask.enumerate_pixels_mut() {
            let inside = inside_rounded(
                x as f32 + 0.5 - origin_x,
                y as f32 + 0.5 - shadow_y,
                bw,
                bh,
                radius,
            );
            *px = Luma([if inside { 255 } else { 0 }]);
        }
        // CSS blur radius is twice the Gaussian sigma.
        let blurred = imageops::blur(&mask, (SHADOW_BLUR * scale) as f32 / 2.0);

        for (x, y, px) in canvas.enumerate_pixels_mut() {
            let coverage = blurred.get_pixel(x, y)[0] as u32;
            if coverage > 0 {
                let alpha = (SHADOW_COLOR.a as u32 * coverage / 255) as u8;
                px.blend(&Color { a: alpha, ..SHADOW_COLOR }.to_rgba());
            }
        }
    }

    for (x, y, px) in canvas.enumerate_pixels_mut() {
        let lx = x as f32 + 0.5 - origin_x;
        let ly = y as f32 + 0.5 - origin_y;
        if inside_rounded(lx, ly, bw, bh, radius) {
            let color = container
                .background
                .color_at(lx / sf, ly / sf, box_w as f32, box_h as f32);
            px.blend(&color.to_rgba());
        }
    }

    let scaled = imageops::resize(
        symbol,
        symbol.width() * scale,
        symbol.height() * scale,
        FilterType::Nearest,
    );
    let sx = (pad_x + container.padding) * scale;
    let sy = (pad_top + container.padding) * scale;
    imageops::overlay(&mut canvas, &scaled, sx as i64, sy as i64);

    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn symbol() -> RgbaImage {
        RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]))
    }

    fn plain(background: Background) -> StyledContainer {
        StyledContainer {
            background,
            border_radius: 0,
            shadow: false,
            padding: 4,
        }
    }

    #[test]
    fn test_solid_container_size_and_scale() {
        let img = rasterize(&plain(Background::Solid(Color::WHITE)), &symbol(), Color::WHITE, 2);
        assert_eq!(img.dimensions(), (36, 36));
        assert_eq!(img.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
        // Symbol starts at padding * scale
        assert_eq!(img.get_pixel(8, 8), &Rgba([0, 0, 0, 255]));
        assert_eq!(img.get_pixel(7, 7), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_gradient_runs_between_colors() {
        let bg = Background::Gradient {
            angle: 90.0,
            from: Color::rgb(255, 0, 0),
            to: Color::rgb(0, 0, 255),
        };
        let img = rasterize(&plain(bg), &symbol(), Color::WHITE, 1);
        let left = img.get_pixel(0, 0);
        let right = img.get_pixel(img.width() - 1, 0);
        assert!(left[0] > 200 && left[2] < 50);
        assert!(right[2] > 200 && right[0] < 50);
    }

    #[test]
    fn test_rounded_corner_shows_canvas_background() {
        let container = StyledContainer {
            border_radius: 6,
            ..plain(Background::Solid(Color::rgb(0, 255, 0)))
        };
        let img = rasterize(&container, &symbol(), Color::rgb(255, 0, 255), 1);
        assert_eq!(img.get_pixel(0, 0), &Rgba([255, 0, 255, 255]));
        assert_eq!(img.get_pixel(9, 0), &Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn test_shadow_extends_canvas_and_darkens_below() {
        let container = StyledContainer {
            shadow: true,
            ..plain(Background::Solid(Color::WHITE))
        };
        let img = rasterize(&container, &symbol(), Color::WHITE, 1);
        assert_eq!(img.width(), 18 + SHADOW_BLUR * 2);
        assert_eq!(img.height(), 18 + SHADOW_BLUR * 2 + SHADOW_OFFSET_Y);
        // Just below the box, centred: shadow shows
        let below = img.get_pixel(img.width() / 2, SHADOW_BLUR + 18 + 2);
        assert!(below[0] < 255);
        // Far corner: untouched
        assert_eq!(img.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_pattern_has_ink() {
        let bg = Background::Pattern {
            base: Color::WHITE,
            pattern: Pattern::Grid,
        };
        let container = StyledContainer {
            padding: 20,
            ..plain(bg)
        };
        let img = rasterize(&container, &symbol(), Color::WHITE, 1);
        assert_ne!(img.get_pixel(0, 5), &Rgba([255, 255, 255, 255]));
        assert_eq!(img.get_pixel(5, 5), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_inside_rounded() {
        assert!(inside_rounded(5.0, 5.0, 10.0, 10.0, 3.0));
        assert!(!inside_rounded(0.1, 0.1, 10.0, 10.0, 3.0));
        assert!(inside_rounded(0.1, 0.1, 10.0, 10.0, 0.0));
        assert!(!inside_rounded(-1.0, 5.0, 10.0, 10.0, 0.0));
    }
}
