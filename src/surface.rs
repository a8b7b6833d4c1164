//! The drawable surface encoders render onto.
//!
//! A surface only ever changes through [`Surface::commit`]. A failed render
//! never reaches it, so it always shows the last successful one.

use image::{ImageEncoder, RgbaImage};

/// In-memory raster target holding the last committed render.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    image: Option<RgbaImage>,
    revision: u64,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current render, if anything has been committed yet.
    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    pub fn is_blank(&self) -> bool {
        self.image.is_none()
    }

    /// Number of commits so far. Bumps on every commit, even if the pixels match.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the surface contents.
    pub fn commit(&mut self, image: RgbaImage) {
        self.image = Some(image);
        self.revision += 1;
    }

    /// Encode the current render as PNG, or `None` when blank.
    pub fn to_png(&self) -> Result<Option<Vec<u8>>, image::ImageError> {
        self.image.as_ref().map(encode_png).transpose()
    }
}

/// Encode an RGBA buffer as PNG bytes.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut png_bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
    encoder.write_image(
        img.as_raw(),
        img.width(),
        img.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(png_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_new_surface_is_blank() {
        let surface = Surface::new();
        assert!(surface.is_blank());
        assert_eq!(surface.revision(), 0);
        assert!(surface.to_png().unwrap().is_none());
    }

    #[test]
    fn test_commit_replaces_image() {
        let mut surface = Surface::new();
        surface.commit(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255])));
        surface.commit(RgbaImage::from_pixel(3, 1, Rgba([255, 0, 0, 255])));
        assert_eq!(surface.revision(), 2);
        assert_eq!(surface.image().unwrap().dimensions(), (3, 1));
    }

    #[test]
    fn test_png_signature() {
        let mut surface = Surface::new();
        surface.commit(RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255])));
        let png = surface.to_png().unwrap().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
