use crate::hasher::ArgonCredentialHasher;
use crate::notify::{LogNotifier, Notifier};
use auth_access::repository::{InMemoryAttemptLog, InMemorySessionStore, InMemoryUserRegistry};
use auth_access::{AuthService, SecurityConfig};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Main DiagCare server state, cloned into every handler.
#[derive(Clone)]
pub struct DiagcareServer {
    /// Server configuration
    pub config: ServerConfig,
    /// The security core: users, sessions, lockout, permissions
    pub auth: Arc<AuthService>,
    /// Post-creation notification boundary
    pub notifier: Arc<dyn Notifier>,
    /// Process start, for health reporting
    pub started_at: Instant,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server name
    pub name: String,
    /// Listen address, e.g. `0.0.0.0:8081`
    pub bind_addr: String,
    /// How often the background reaper removes expired sessions and idle
    /// attempt windows, in seconds
    pub reaper_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "DiagCare Engine".to_string(),
            bind_addr: "0.0.0.0:8081".to_string(),
            reaper_interval_secs: 60,
        }
    }
}

impl ServerConfig {
    /// Read server settings from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            name: std::env::var("DIAGCARE_SERVER_NAME").unwrap_or(defaults.name),
            bind_addr: std::env::var("DIAGCARE_BIND_ADDR").unwrap_or(defaults.bind_addr),
            reaper_interval_secs: std::env::var("DIAGCARE_REAPER_INTERVAL_SECS")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.reaper_interval_secs),
        }
    }
}

impl DiagcareServer {
    /// Build a server from environment configuration with the default
    /// in-memory backends and the Argon2 hashing collaborator.
    ///
    /// `DIAGCARE_SECURITY_CONFIG` may carry a JSON security policy; a
    /// malformed or out-of-range payload falls back to defaults instead of
    /// failing startup.
    pub fn from_env() -> Self {
        let security_config = match std::env::var("DIAGCARE_SECURITY_CONFIG") {
            Ok(raw) => SecurityConfig::from_json_or_default(&raw),
            Err(_) => SecurityConfig::default(),
        };
        Self::new(ServerConfig::from_env(), security_config)
    }

    pub fn new(config: ServerConfig, security_config: SecurityConfig) -> Self {
        let auth = AuthService::new(
            Arc::new(InMemoryUserRegistry::new()),
            Arc::new(InMemorySessionStore::new()),
            Arc::new(InMemoryAttemptLog::new()),
            Arc::new(ArgonCredentialHasher::new()),
            security_config,
        );
        info!(name = %config.name, "server state initialized");

        Self {
            config,
            auth: Arc::new(auth),
            notifier: Arc::new(LogNotifier),
            started_at: Instant::now(),
        }
    }

    /// Swap the notification backend; useful for tests and deployments
    /// with a real mail gateway.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }
}

impl std::fmt::Debug for DiagcareServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagcareServer")
            .field("config", &self.config)
            .finish()
    }
}
