//! Server slot configuration panel library.
//!
//! The core lives in [`slots`]: the slot model, the JSON snapshot store, the
//! artifact renderer and the configuration service. [`http`] exposes it over
//! axum; the remaining modules carry configuration, logging, metrics and
//! process lifecycle.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod slots;

pub use config::schema::PanelConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use slots::{ConfigurationService, PanelError};
