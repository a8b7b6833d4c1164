//! Session API handlers.
//!
//! A session owns one [`ConfigurableCodeRenderer`]. Actions are reduced under
//! the session lock, the encoder runs on a blocking thread without the lock
//! held, and the result is committed through the render ticket so that only
//! the newest request for a session reaches its surface.

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    export,
    options::{Action, RenderOptions},
    presets,
    session::ConfigurableCodeRenderer,
    surface::encode_png,
    sync::Pending,
};

use super::super::state::{AppState, Session};
use super::{attachment, export_error, parse_format, task_error};

type ApiError = (StatusCode, String);

/// Snapshot of a session returned by every session endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub id: Uuid,
    pub options: RenderOptions,
    /// What the last synchronization did (`rendered`, `unchanged`, ...).
    pub status: &'static str,
    /// Rejection from the encoder, if the surface is showing an older render.
    pub error: Option<String>,
    /// Surface revision, for cache-busting the preview image.
    pub revision: u64,
}

impl SessionState {
    fn of(id: Uuid, renderer: &ConfigurableCodeRenderer) -> Self {
        Self {
            id,
            options: renderer.options().clone(),
            status: renderer.last_outcome().label(),
            error: renderer.last_error().map(|e| e.to_string()),
            revision: renderer.surface().revision(),
        }
    }
}

fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| (StatusCode::BAD_REQUEST, "Invalid session ID".to_string()))
}

fn not_found() -> ApiError {
    (
        StatusCode::NOT_FOUND,
        "Session not found or expired".to_string(),
    )
}

/// POST /api/sessions - Start a session, optionally from given options.
pub async fn create(
    State(state): State<Arc<AppState>>,
    body: Option<Json<RenderOptions>>,
) -> Result<Json<SessionState>, ApiError> {
    let options = body.map(|Json(o)| o).unwrap_or_default();

    // First render happens in the constructor
    let renderer =
        tokio::task::spawn_blocking(move || ConfigurableCodeRenderer::with_options(options))
            .await
            .map_err(task_error)?;

    let id = Uuid::new_v4();
    let snapshot = SessionState::of(id, &renderer);

    let mut sessions = state.sessions.write().await;
    sessions.insert(id, Session::new(renderer));
    info!(session = %id, active = sessions.len(), "Session created");

    Ok(Json(snapshot))
}

/// GET /api/sessions/:id - Current state.
pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionState>, ApiError> {
    let id = parse_id(&id)?;
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or_else(not_found)?;
    session.touch();
    Ok(Json(SessionState::of(id, &session.renderer)))
}

/// POST /api/sessions/:id/actions - Apply one action.
pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(action): Json<Action>,
) -> Result<Json<SessionState>, ApiError> {
    let id = parse_id(&id)?;
    debug!(session = %id, ?action, "Action");
    let action = action.clamped();
    apply_and_render(&state, id, move |_| action).await.map(Json)
}

/// POST /api/sessions/:id/randomize - Random content for the current type.
pub async fn randomize(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionState>, ApiError> {
    let id = parse_id(&id)?;
    let today = chrono::Local::now().date_naive();

    // Content is drawn under the same lock that applies it
    apply_and_render(&state, id, |options| {
        let mut rng = rand::rng();
        Action::SetContent(presets::random_content(options.code_type, &mut rng, today))
    })
    .await
    .map(Json)
}

/// Reduce under the lock, encode outside it, commit under it again.
///
/// `action` sees the options as they are when the lock is taken.
async fn apply_and_render<F>(
    state: &AppState,
    id: Uuid,
    action: F,
) -> Result<SessionState, ApiError>
where
    F: FnOnce(&RenderOptions) -> Action,
{
    let (ticket, encoders) = {
        let mut sessions = state.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or_else(not_found)?;
        session.touch();
        let action = action(session.renderer.options());
        session.renderer.apply(action);

        match session.renderer.begin_render() {
            Pending::Skipped(_) => return Ok(SessionState::of(id, &session.renderer)),
            Pending::Ready(ticket) => (ticket, session.renderer.encoders().clone()),
        }
    };

    let job = ticket.job().clone();
    let result = tokio::task::spawn_blocking(move || encoders.render(&job))
        .await
        .map_err(task_error)?;

    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or_else(not_found)?;
    session.renderer.complete_render(ticket, result);
    Ok(SessionState::of(id, &session.renderer))
}

/// GET /api/sessions/:id/preview - The bare surface as PNG.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;

    let image = {
        let mut sessions = state.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or_else(not_found)?;
        session.touch();
        session.renderer.surface().image().cloned()
    }
    .ok_or((StatusCode::NOT_FOUND, "Nothing rendered yet".to_string()))?;

    let png_bytes = tokio::task::spawn_blocking(move || encode_png(&image))
        .await
        .map_err(task_error)?
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode preview: {}", e),
            )
        })?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        png_bytes,
    )
        .into_response())
}

/// GET /api/sessions/:id/export/:format - Download PNG or SVG.
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path((id, format)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let format = parse_format(&format)?;

    let (options, surface, encoders) = {
        let mut sessions = state.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or_else(not_found)?;
        session.touch();
        let r = &session.renderer;
        (r.options().clone(), r.surface().clone(), r.encoders().clone())
    };

    let download = tokio::task::spawn_blocking(move || match format {
        export::ExportFormat::Png => export::export_png(&options, &surface),
        export::ExportFormat::Svg => export::export_svg(&options, &encoders),
    })
    .await
    .map_err(task_error)?
    .map_err(export_error)?;

    Ok(attachment(download))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CodeType;
    use crate::server::ServerConfig;

    async fn state_with(renderer: ConfigurableCodeRenderer) -> (AppState, Uuid) {
        let state = AppState::new(ServerConfig::default());
        let id = Uuid::new_v4();
        state
            .sessions
            .write()
            .await
            .insert(id, Session::new(renderer));
        (state, id)
    }

    #[tokio::test]
    async fn test_action_is_built_from_locked_options() {
        let mut renderer = ConfigurableCodeRenderer::new();
        renderer.dispatch(Action::SetCodeType(CodeType::Barcode));
        let (state, id) = state_with(renderer).await;

        let snapshot = apply_and_render(&state, id, |options| {
            assert_eq!(options.code_type, CodeType::Barcode);
            Action::SetContent(format!("{}99", options.content))
        })
        .await
        .unwrap();

        assert_eq!(snapshot.options.content, "123456789099");
        assert_eq!(snapshot.status, "rendered");
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let (state, _) = state_with(ConfigurableCodeRenderer::new()).await;
        let err = apply_and_render(&state, Uuid::new_v4(), |_| Action::SetMargin(1))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }
}
