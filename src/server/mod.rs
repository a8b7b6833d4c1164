//! # HTTP Server for the Code Configurator
//!
//! Serves the browser configurator and a JSON API over
//! [`ConfigurableCodeRenderer`](crate::session::ConfigurableCodeRenderer)
//! sessions.
//!
//! ## Usage
//!
//! ```bash
//! codegen-pro serve --listen 0.0.0.0:8080
//! ```
//!
//! Then open http://localhost:8080 in a browser.

mod handlers;
mod state;
mod static_files;

pub use state::{DEFAULT_LISTEN_ADDR, SESSION_EXPIRATION_SECS, ServerConfig};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::CodegenError;
use state::AppState;

/// How often expired sessions are swept.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Build the application router.
///
/// Exposed separately from [`serve`] so it can be driven without a socket.
pub fn router(config: ServerConfig) -> Router {
    app(Arc::new(AppState::new(config)))
}

fn app(app_state: Arc<AppState>) -> Router {
    Router::new()
        // Frontend
        .route("/", get(static_files::index_handler))
        .route("/assets/*path", get(static_files::asset_handler))
        // Option data
        .route("/api/options/defaults", get(handlers::options::defaults))
        .route("/api/presets", get(handlers::options::presets))
        .route("/api/formats", get(handlers::options::formats))
        // Sessions
        .route("/api/sessions", post(handlers::sessions::create))
        .route("/api/sessions/:id", get(handlers::sessions::show))
        .route(
            "/api/sessions/:id/actions",
            post(handlers::sessions::dispatch),
        )
        .route(
            "/api/sessions/:id/randomize",
            post(handlers::sessions::randomize),
        )
        .route(
            "/api/sessions/:id/preview",
            get(handlers::sessions::preview),
        )
        .route(
            "/api/sessions/:id/export/:format",
            get(handlers::sessions::download),
        )
        // Stateless render
        .route("/api/render/:format", post(handlers::render::render))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use codegen_pro::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), codegen_pro::error::CodegenError> {
/// serve(ServerConfig::default()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), CodegenError> {
    let app_state = Arc::new(AppState::new(config.clone()));

    // Spawn background session cleanup task
    tokio::spawn(cleanup_sessions(app_state.clone()));

    let app = app(app_state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            CodegenError::Server(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    info!(
        listen = %config.listen_addr,
        session_ttl_secs = config.session_ttl.as_secs(),
        "Codegen Pro HTTP server started"
    );
    info!("Open http://{}/ in your browser", config.listen_addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| CodegenError::Server(format!("Server error: {}", e)))?;

    Ok(())
}

/// Background task to drop idle sessions.
async fn cleanup_sessions(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        interval.tick().await;
        let removed = state.evict_expired(Instant::now()).await;
        if removed > 0 {
            let remaining = state.sessions.read().await.len();
            info!(removed, remaining, "Cleaned up expired sessions");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ConfigurableCodeRenderer;
    use state::Session;

    #[tokio::test]
    async fn test_evict_expired_sessions() {
        let state = AppState::new(ServerConfig {
            session_ttl: Duration::from_secs(10),
            ..Default::default()
        });
        let now = Instant::now();
        {
            let mut sessions = state.sessions.write().await;
            let mut old = Session::new(ConfigurableCodeRenderer::new());
            old.last_accessed = now - Duration::from_secs(11);
            sessions.insert(uuid::Uuid::new_v4(), old);
            sessions.insert(
                uuid::Uuid::new_v4(),
                Session::new(ConfigurableCodeRenderer::new()),
            );
        }
        assert_eq!(state.evict_expired(now + Duration::from_secs(1)).await, 1);
        assert_eq!(state.sessions.read().await.len(), 1);
    }
}
