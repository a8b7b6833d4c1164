//! Stateless render API.

use axum::{Json, extract::Path, http::StatusCode, response::Response};
use tracing::debug;

use crate::{
    export::{self, ExportError, ExportFormat},
    options::RenderOptions,
    session::ConfigurableCodeRenderer,
    sync::Encoders,
};

use super::{attachment, export_error, parse_format, task_error};

/// POST /api/render/:format - Render options straight to a download.
pub async fn render(
    Path(format): Path<String>,
    Json(options): Json<RenderOptions>,
) -> Result<Response, (StatusCode, String)> {
    let format = parse_format(&format)?;
    let options = options.clamped();
    debug!(code_type = %options.code_type, format = format.extension(), "Stateless render");

    let download = tokio::task::spawn_blocking(move || match format {
        ExportFormat::Png => {
            let renderer = ConfigurableCodeRenderer::with_options(options);
            // A rejected first render leaves nothing to export; report why.
            match renderer.last_error() {
                Some(e) => Err(ExportError::Encode(e.clone())),
                None => renderer.export_png(),
            }
        }
        ExportFormat::Svg => export::export_svg(&options, &Encoders::default()),
    })
    .await
    .map_err(task_error)?
    .map_err(export_error)?;

    Ok(attachment(download))
}
