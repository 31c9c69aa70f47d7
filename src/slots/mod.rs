//! Server-slot configuration core.
//!
//! # Data Flow
//! ```text
//! DesiredSlots (from HTTP form / JSON)
//!     → model.rs   (validate, build Configuration by full replacement)
//!     → render/    (nginx config + compose override, pure)
//!     → service.rs (write artifacts, then snapshot)
//!     → store.rs   (versioned JSON snapshot, atomic rename)
//! ```

pub mod error;
pub mod model;
pub mod render;
pub mod service;
pub mod store;

pub use error::{PanelError, RenderError, SlotField, StorageError, ValidationError};
pub use model::{Configuration, DesiredSlots, SlotName, SlotTriple, DEFAULT_TAG};
pub use render::{Artifacts, RenderContext};
pub use service::ConfigurationService;
pub use store::{JsonFileStore, SnapshotStore};
