//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + MYSQL_* environment
//!     → loader.rs (parse, apply env overrides)
//!     → validation.rs (semantic checks)
//!     → PanelConfig (validated, immutable)
//!     → context.rs (resolved paths + connection parameters)
//!     → PanelContext handed to the configuration service
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod context;
pub mod loader;
pub mod schema;
pub mod validation;

pub use context::{ArtifactPaths, PanelContext};
pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{DatabaseConfig, ImageConfig, ListenerConfig, ObservabilityConfig, PanelConfig};
