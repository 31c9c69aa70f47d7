//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the panel.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the panel.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PanelConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Locations of the snapshot and generated artifacts.
    pub paths: PathsConfig,

    /// Database connection parameters templated into the compose override.
    pub database: DatabaseConfig,

    /// Image repositories the slot tags refer to.
    pub images: ImageConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 64 * 1024,
        }
    }
}

/// File locations. Unset files default to names inside `state_dir`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding the snapshot and, by default, both artifacts.
    pub state_dir: String,

    /// Snapshot file (default: `<state_dir>/state.json`).
    pub snapshot: Option<String>,

    /// Reverse-proxy artifact (default: `<state_dir>/nginx.conf`).
    pub nginx_conf: Option<String>,

    /// Orchestration artifact (default: `<state_dir>/docker-compose.override.yml`).
    pub compose_override: Option<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state_dir: "state".to_string(),
            snapshot: None,
            nginx_conf: None,
            compose_override: None,
        }
    }
}

/// Database connection parameters.
///
/// Overridden by `MYSQL_HOST`, `MYSQL_USER` and `MYSQL_PASSWORD` at load time.
#[derive(Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub user: String,
    pub password: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            user: "root".to_string(),
            password: String::new(),
        }
    }
}

// Keep the password out of logs.
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Image repositories for the primary and companion containers.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ImageConfig {
    pub primary: String,
    pub companion: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            primary: "specifyconsortium/specify7-service".to_string(),
            companion: "specifyconsortium/specify6-service".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
