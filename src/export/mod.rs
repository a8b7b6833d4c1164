//! # Export Adapter
//!
//! Turns the current render into a downloadable file.
//!
//! - **PNG** rasterizes the styled container (background, rounded corners,
//!   shadow) around the surface at [`RASTER_SCALE`]x.
//! - **SVG** re-runs the encoder in vector mode from the options. It holds
//!   only the symbol; container styling is not part of it.
//!
//! Neither operation touches the options.

pub mod raster;
mod save;

pub use raster::{Background, StyledContainer, rasterize};
pub use save::{DirectorySaver, FileSaver};

use thiserror::Error;
use tracing::{error, info};

use crate::encode::{BarcodeEncoder, EncodeError, QrEncoder};
use crate::options::{CodeType, RenderOptions};
use crate::surface::{Surface, encode_png};
use crate::sync::{Encoders, RenderJob};

/// Supersampling factor for PNG export.
pub const RASTER_SCALE: u32 = 2;

/// Characters of QR content used in the filename.
const QR_FILENAME_CHARS: usize = 10;

/// Errors during export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing has been rendered yet")]
    NothingRendered,

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Saving failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Svg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Svg => "svg",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Svg => "image/svg+xml",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "svg" => Some(ExportFormat::Svg),
            _ => None,
        }
    }
}

/// A file ready to hand to a [`FileSaver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Derive the download filename.
///
/// QR uses the first ten characters of content, barcode the whole content.
/// Characters that are unsafe in file names become `_`.
pub fn export_filename(code_type: CodeType, content: &str, format: ExportFormat) -> String {
    let stem: String = match code_type {
        CodeType::Qr => content.chars().take(QR_FILENAME_CHARS).collect(),
        CodeType::Barcode => content.to_string(),
    };
    let stem = sanitize(&stem);

    if stem.is_empty() {
        format!("{}.{}", code_type.file_prefix(), format.extension())
    } else {
        format!("{}-{}.{}", code_type.file_prefix(), stem, format.extension())
    }
}

fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Rasterize the styled container around the current surface as PNG.
pub fn export_png(options: &RenderOptions, surface: &Surface) -> Result<Download, ExportError> {
    let result = surface
        .image()
        .ok_or(ExportError::NothingRendered)
        .and_then(|symbol| {
            let container = StyledContainer::from_options(options);
            let img = rasterize(&container, symbol, options.background_color, RASTER_SCALE);
            Ok(encode_png(&img)?)
        });

    finish(options, ExportFormat::Png, result)
}

/// Re-encode the current options as an SVG document.
pub fn export_svg<Q: QrEncoder, B: BarcodeEncoder>(
    options: &RenderOptions,
    encoders: &Encoders<Q, B>,
) -> Result<Download, ExportError> {
    let job = RenderJob::for_vector(options);
    let result = encoders
        .to_svg(&job)
        .map(String::into_bytes)
        .map_err(ExportError::from);

    finish(options, ExportFormat::Svg, result)
}

/// Wrap bytes into a download, logging either way.
fn finish(
    options: &RenderOptions,
    format: ExportFormat,
    result: Result<Vec<u8>, ExportError>,
) -> Result<Download, ExportError> {
    match result {
        Ok(bytes) => {
            let filename = export_filename(options.code_type, &options.content, format);
            info!(%filename, bytes = bytes.len(), "Exported");
            Ok(Download {
                filename,
                mime: format.mime(),
                bytes,
            })
        }
        Err(e) => {
            error!(error = %e, format = format.extension(), "Error downloading");
            Err(e)
        }
    }
}
