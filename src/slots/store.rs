//! Durable snapshot storage.
//!
//! # Responsibilities
//! - Load the current `Configuration`, defaulting to all-absent on first run
//! - Save a `Configuration` so readers see either the old or the new snapshot
//!
//! # Design Decisions
//! - Versioned JSON envelope: `{ "version": 1, "slots": { ... } }`
//! - Writes go to a hidden sibling temp file, are synced, then renamed into place
//! - Only `NotFound` is a normal outcome on load; everything else propagates

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::slots::error::StorageError;
use crate::slots::model::Configuration;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Durable home of the configuration.
pub trait SnapshotStore: Send + Sync {
    /// Read the persisted configuration.
    fn load(&self) -> Result<Configuration, StorageError>;

    /// Replace the persisted configuration.
    fn save(&self, config: &Configuration) -> Result<(), StorageError>;
}

#[derive(Serialize)]
struct SnapshotOut<'a> {
    version: u32,
    slots: &'a Configuration,
}

#[derive(Deserialize)]
struct SnapshotIn {
    version: u32,
    slots: serde_json::Value,
}

/// Snapshot kept as a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn corrupt(&self, source: serde_json::Error) -> StorageError {
        StorageError::Corrupt {
            path: self.path.clone(),
            source,
        }
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Configuration, StorageError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No snapshot yet, starting with all slots absent");
                return Ok(Configuration::empty());
            }
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let snapshot: SnapshotIn = serde_json::from_slice(&bytes).map_err(|e| self.corrupt(e))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StorageError::UnsupportedVersion {
                path: self.path.clone(),
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }

        serde_json::from_value(snapshot.slots).map_err(|e| self.corrupt(e))
    }

    fn save(&self, config: &Configuration) -> Result<(), StorageError> {
        let snapshot = SnapshotOut {
            version: SNAPSHOT_VERSION,
            slots: config,
        };
        let mut json = serde_json::to_vec_pretty(&snapshot).map_err(|e| self.corrupt(e))?;
        json.push(b'\n');

        write_atomic(&self.path, &json)?;
        tracing::debug!(
            path = %self.path.display(),
            configured_slots = config.configured_count(),
            "Snapshot saved"
        );
        Ok(())
    }
}

/// Replace `path` with `contents` via temp file + rename.
///
/// The temp file lives in the same directory so the rename never crosses
/// filesystems.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StorageError> {
    let write_err = |source: std::io::Error| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = path.with_file_name(format!(".{file_name}.tmp"));

    let result = File::create(&tmp_path)
        .and_then(|mut file| {
            file.write_all(contents)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&tmp_path, path));

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(write_err(e));
    }
    Ok(())
}
