//! HTTP handlers for the server.

pub mod options;
pub mod render;
pub mod sessions;

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::export::{Download, ExportError, ExportFormat};

/// Parse the `:format` path segment.
fn parse_format(format: &str) -> Result<ExportFormat, (StatusCode, String)> {
    ExportFormat::parse(format).ok_or((
        StatusCode::NOT_FOUND,
        format!("Unknown export format '{}'", format),
    ))
}

/// Map an export failure to a status code.
///
/// Rejected content is the client's problem; anything else is ours.
fn export_error(e: ExportError) -> (StatusCode, String) {
    let status = match e {
        ExportError::NothingRendered | ExportError::Encode(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ExportError::Image(_) | ExportError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

fn task_error(e: tokio::task::JoinError) -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Task error: {}", e),
    )
}

/// Serve a download as an attachment.
fn attachment(download: Download) -> Response {
    let disposition = format!(
        "attachment; filename=\"{}\"",
        download.filename.replace('"', "_")
    );
    (
        [
            (header::CONTENT_TYPE, download.mime.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.bytes,
    )
        .into_response()
}
