//! Error kinds of the slot configuration core.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::slots::model::SlotName;

/// Which part of a slot triple a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotField {
    PrimaryTag,
    CompanionTag,
    Database,
}

impl fmt::Display for SlotField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SlotField::PrimaryTag => "primary tag",
            SlotField::CompanionTag => "companion tag",
            SlotField::Database => "database",
        })
    }
}

/// A malformed or incomplete update request. Nothing is written when one occurs.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("slot {0} is missing from the request")]
    MissingSlot(SlotName),

    #[error("unknown slot name {0:?}")]
    UnknownSlot(String),

    #[error("slot {0} is named more than once")]
    DuplicateSlot(String),

    #[error("slot {0} is configured without a database")]
    MissingDatabase(SlotName),

    #[error("slot {slot}: invalid {field} {value:?}")]
    InvalidValue {
        slot: SlotName,
        field: SlotField,
        value: String,
    },

    #[error("invalid request host {0:?}")]
    InvalidHost(String),
}

/// Failure reading or writing the snapshot or an artifact file.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("snapshot {} has unsupported version {found} (expected {expected})", path.display())]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
}

/// Renderer input that cannot be expressed in an artifact.
///
/// Validation applies the same rules first, so seeing one of these means a
/// caller bypassed validation.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("slot {slot}: {field} {value:?} cannot be embedded in a rendered artifact")]
    InvalidValue {
        slot: SlotName,
        field: SlotField,
        value: String,
    },

    #[error("host {0:?} cannot be embedded in a rendered artifact")]
    InvalidHost(String),
}

/// Any failure of the configuration core.
#[derive(Debug, Error)]
pub enum PanelError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl PanelError {
    /// Short machine-readable kind, used in logs, metrics and error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            PanelError::Validation(_) => "validation_error",
            PanelError::Storage(_) => "storage_error",
            PanelError::Render(_) => "render_error",
        }
    }
}
