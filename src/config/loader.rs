//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::PanelConfig;
use crate::config::validation::{validate_config, ConfigViolation};

/// Environment variables that override `[database]`.
pub const ENV_MYSQL_HOST: &str = "MYSQL_HOST";
pub const ENV_MYSQL_USER: &str = "MYSQL_USER";
pub const ENV_MYSQL_PASSWORD: &str = "MYSQL_PASSWORD";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ConfigViolation>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<PanelConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content, |key| std::env::var(key).ok())
}

/// Load from `path` when given, otherwise start from defaults.
///
/// Environment overrides and validation apply either way.
pub fn load_or_default(path: Option<&Path>) -> Result<PanelConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => finish(PanelConfig::default(), |key| std::env::var(key).ok()),
    }
}

/// Parse TOML text, then apply overrides from `lookup` and validate.
pub fn parse_config<F>(content: &str, lookup: F) -> Result<PanelConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let config: PanelConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    finish(config, lookup)
}

fn finish<F>(mut config: PanelConfig, lookup: F) -> Result<PanelConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    apply_env_overrides(&mut config, lookup);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overwrite database parameters with values from the environment.
pub fn apply_env_overrides<F>(config: &mut PanelConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup(ENV_MYSQL_HOST) {
        config.database.host = host;
    }
    if let Some(user) = lookup(ENV_MYSQL_USER) {
        config.database.user = user;
    }
    if let Some(password) = lookup(ENV_MYSQL_PASSWORD) {
        config.database.password = password;
    }
}
