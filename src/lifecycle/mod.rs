//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → subscribers (HTTP server) stop accepting → drain → exit
//! ```
//!
//! # Design Decisions
//! - Snapshot and artifact writes are atomic, so an interrupted update leaves
//!   either the old or the new file in place

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
