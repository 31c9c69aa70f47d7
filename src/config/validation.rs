//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Reject settings that would render broken artifacts (empty image names)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: PanelConfig → Result<(), Vec<ConfigViolation>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::PanelConfig;

/// One semantic problem with a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigViolation {
    /// Dotted path of the offending key, e.g. `listener.bind_address`.
    pub field: &'static str,
    pub message: String,
}

impl ConfigViolation {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a parsed configuration for semantic problems.
pub fn validate_config(config: &PanelConfig) -> Result<(), Vec<ConfigViolation>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ConfigViolation::new(
            "listener.bind_address",
            format!("{:?} is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ConfigViolation::new("listener.max_body_bytes", "must be greater than 0"));
    }
    if config.paths.state_dir.trim().is_empty() {
        errors.push(ConfigViolation::new("paths.state_dir", "must not be empty"));
    }
    for (field, value) in [
        ("paths.snapshot", &config.paths.snapshot),
        ("paths.nginx_conf", &config.paths.nginx_conf),
        ("paths.compose_override", &config.paths.compose_override),
    ] {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            errors.push(ConfigViolation::new(field, "must not be empty when set"));
        }
    }
    if config.images.primary.trim().is_empty() {
        errors.push(ConfigViolation::new("images.primary", "must not be empty"));
    }
    if config.images.companion.trim().is_empty() {
        errors.push(ConfigViolation::new("images.companion", "must not be empty"));
    }
    if config.database.host.trim().is_empty() {
        errors.push(ConfigViolation::new("database.host", "must not be empty"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ConfigViolation::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ConfigViolation::new(
            "observability.metrics_address",
            format!(
                "{:?} is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&PanelConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_violation() {
        let mut config = PanelConfig::default();
        config.listener.bind_address = "nowhere".to_string();
        config.images.companion = " ".to_string();
        config.timeouts.request_secs = 0;
        config.paths.nginx_conf = Some(String::new());

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "paths.nginx_conf",
                "images.companion",
                "timeouts.request_secs",
            ]
        );
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = PanelConfig::default();
        config.observability.metrics_address = "bogus".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "observability.metrics_address");
    }
}
