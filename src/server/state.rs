//! Server state and configuration.

use std::collections::HashMap;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::session::ConfigurableCodeRenderer;

/// Default address to listen on.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

/// Idle time after which a session is dropped.
pub const SESSION_EXPIRATION_SECS: u64 = 30 * 60;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Idle time after which a session is dropped
    pub session_ttl: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            session_ttl: Duration::from_secs(SESSION_EXPIRATION_SECS),
        }
    }
}

/// One browser tab's configurator.
pub struct Session {
    pub renderer: ConfigurableCodeRenderer,
    pub last_accessed: Instant,
}

impl Session {
    pub fn new(renderer: ConfigurableCodeRenderer) -> Self {
        Self {
            renderer,
            last_accessed: Instant::now(),
        }
    }

    /// Update last accessed time.
    pub fn touch(&mut self) {
        self.last_accessed = Instant::now();
    }
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    /// Unix timestamp of server boot for cache busting.
    pub boot_time: u64,
    pub sessions: RwLock<HashMap<Uuid, Session>>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let boot_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            config,
            boot_time,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Drop sessions idle for longer than the configured TTL.
    ///
    /// Returns how many were removed.
    pub async fn evict_expired(&self, now: Instant) -> usize {
        let ttl = self.config.session_ttl;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| now.duration_since(s.last_accessed) < ttl);
        before - sessions.len()
    }
}
