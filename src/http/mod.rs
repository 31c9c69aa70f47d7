//! HTTP adapter in front of the configuration service.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, span)
//!     → forms.rs (form fields → DesiredSlots) / JSON body
//!     → handlers.rs (blocking service call)
//!     → error.rs (PanelError → status + JSON body)
//! ```

pub mod error;
pub mod forms;
pub mod handlers;
pub mod request;
pub mod server;

pub use error::ApiError;
pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
