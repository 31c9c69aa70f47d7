//! Resolved runtime context handed to the configuration service.
//!
//! Built once at startup from a validated `PanelConfig`; business logic never
//! reads the environment or derives paths on its own.

use std::path::{Path, PathBuf};

use crate::config::schema::{DatabaseConfig, ImageConfig, PanelConfig};

pub const SNAPSHOT_FILE: &str = "state.json";
pub const NGINX_CONF_FILE: &str = "nginx.conf";
pub const COMPOSE_OVERRIDE_FILE: &str = "docker-compose.override.yml";

/// Where the generated artifacts are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub nginx_conf: PathBuf,
    pub compose_override: PathBuf,
}

/// Everything the service needs besides the store itself.
#[derive(Debug, Clone)]
pub struct PanelContext {
    pub snapshot_path: PathBuf,
    pub artifacts: ArtifactPaths,
    pub database: DatabaseConfig,
    pub images: ImageConfig,
}

impl PanelContext {
    pub fn from_config(config: &PanelConfig) -> Self {
        let state_dir = Path::new(&config.paths.state_dir);
        let resolve = |explicit: &Option<String>, default: &str| {
            explicit
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or_else(|| state_dir.join(default))
        };

        Self {
            snapshot_path: resolve(&config.paths.snapshot, SNAPSHOT_FILE),
            artifacts: ArtifactPaths {
                nginx_conf: resolve(&config.paths.nginx_conf, NGINX_CONF_FILE),
                compose_override: resolve(&config.paths.compose_override, COMPOSE_OVERRIDE_FILE),
            },
            database: config.database.clone(),
            images: config.images.clone(),
        }
    }

    /// Context with every file inside `state_dir` and default parameters.
    pub fn in_dir(state_dir: impl AsRef<Path>) -> Self {
        let mut config = PanelConfig::default();
        config.paths.state_dir = state_dir.as_ref().to_string_lossy().into_owned();
        Self::from_config(&config)
    }
}
