//! Static option data for the form.

use axum::Json;
use serde::Serialize;

use crate::options::{BarcodeFormat, RenderOptions};
use crate::presets::{QR_PRESETS, QrPreset};

/// A symbology as listed in the format picker.
#[derive(Debug, Serialize)]
pub struct FormatInfo {
    pub name: &'static str,
    pub description: &'static str,
}

/// GET /api/options/defaults - Default options.
pub async fn defaults() -> Json<RenderOptions> {
    Json(RenderOptions::default())
}

/// GET /api/presets - QR content presets.
pub async fn presets() -> Json<&'static [QrPreset]> {
    Json(QR_PRESETS)
}

/// GET /api/formats - Supported barcode symbologies.
pub async fn formats() -> Json<Vec<FormatInfo>> {
    Json(format_list())
}

pub fn format_list() -> Vec<FormatInfo> {
    BarcodeFormat::ALL
        .iter()
        .map(|f| FormatInfo {
            name: f.name(),
            description: f.description(),
        })
        .collect()
}
