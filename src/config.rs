//! Option files.
//!
//! An options file is the camelCase JSON form of [`RenderOptions`]. Missing
//! fields take their defaults and numeric fields are clamped into the form
//! bounds, so hand-written files can be partial.
//!
//! ```json
//! { "codeType": "BARCODE", "barcodeFormat": "EAN13", "content": "590123412345" }
//! ```

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::CodegenError;
use crate::options::RenderOptions;

/// Parse options from JSON text.
pub fn parse_options(json: &str) -> Result<RenderOptions, CodegenError> {
    let options: RenderOptions =
        serde_json::from_str(json).map_err(|e| CodegenError::Options(e.to_string()))?;
    Ok(options.clamped())
}

/// Load options from a JSON file.
pub fn load_options(path: &Path) -> Result<RenderOptions, CodegenError> {
    let json = fs::read_to_string(path)?;
    let options = parse_options(&json).map_err(|e| match e {
        CodegenError::Options(msg) => {
            CodegenError::Options(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })?;
    debug!(path = %path.display(), "Loaded options");
    Ok(options)
}

/// Write options as pretty JSON.
pub fn save_options(path: &Path, options: &RenderOptions) -> Result<(), CodegenError> {
    let json =
        serde_json::to_string_pretty(options).map_err(|e| CodegenError::Options(e.to_string()))?;
    fs::write(path, json)?;
    Ok(())
}
