//! Configuration service: the single write path for slot configuration.
//!
//! # Responsibilities
//! - Validate a desired slot mapping and build the replacement `Configuration`
//! - Render both artifacts and write them before the snapshot
//! - Serialize updates within the process
//! - Serve reads (`get_current`, `database_for`, previews) straight from the store
//!
//! # Design Decisions
//! - Full replacement: the previous configuration is loaded only for consistency
//!   checks and change logging, never merged
//! - Write order is artifacts first, snapshot last; success is reported only after
//!   all three writes
//! - The restart token is generated here so the renderer stays pure

use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use uuid::Uuid;

use crate::config::{ArtifactPaths, DatabaseConfig, ImageConfig, PanelContext};
use crate::observability::metrics;
use crate::slots::error::{PanelError, ValidationError};
use crate::slots::model::{Configuration, DesiredSlots, SlotName};
use crate::slots::render::{self, Artifacts, RenderContext};
use crate::slots::store::{write_atomic, JsonFileStore, SnapshotStore};

/// Orchestrates validation, rendering and persistence of slot configuration.
pub struct ConfigurationService<S = JsonFileStore> {
    store: S,
    artifacts: ArtifactPaths,
    database: DatabaseConfig,
    images: ImageConfig,
    update_lock: Mutex<()>,
}

impl ConfigurationService<JsonFileStore> {
    /// Service backed by the JSON snapshot named in `context`.
    pub fn new(context: PanelContext) -> Self {
        let store = JsonFileStore::new(context.snapshot_path.clone());
        Self::with_store(store, context)
    }
}

impl<S: SnapshotStore> ConfigurationService<S> {
    pub fn with_store(store: S, context: PanelContext) -> Self {
        Self {
            store,
            artifacts: context.artifacts,
            database: context.database,
            images: context.images,
            update_lock: Mutex::new(()),
        }
    }

    pub fn artifact_paths(&self) -> &ArtifactPaths {
        &self.artifacts
    }

    /// The persisted configuration.
    pub fn get_current(&self) -> Result<Configuration, PanelError> {
        Ok(self.store.load()?)
    }

    /// Database currently assigned to `slot`, if the slot is configured.
    pub fn database_for(&self, slot: SlotName) -> Result<Option<String>, PanelError> {
        let current = self.store.load()?;
        Ok(current.get(slot).map(|triple| triple.database.clone()))
    }

    /// Render both artifacts for the stored configuration without writing them.
    pub fn render_preview(&self, request_host: &str) -> Result<Artifacts, PanelError> {
        let host = normalize_host(request_host)?;
        let current = self.store.load()?;
        Ok(render::render_all(&current, &self.render_context(&host), Uuid::new_v4())?)
    }

    /// Replace the whole configuration with `desired`.
    ///
    /// On success both artifacts and the snapshot reflect the returned
    /// configuration. On a validation error nothing is written.
    pub fn update(&self, desired: DesiredSlots, request_host: &str) -> Result<Configuration, PanelError> {
        let start = Instant::now();
        let _guard = self.update_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let result = self.apply(desired, request_host);
        match &result {
            Ok(config) => {
                metrics::record_update("success", start);
                metrics::record_configured_slots(config.configured_count());
            }
            Err(e) if matches!(e, PanelError::Render(_)) => {
                tracing::error!(error = %e, "Rendering rejected a validated configuration");
                metrics::record_update(e.kind(), start);
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = e.kind(), "Configuration update failed");
                metrics::record_update(e.kind(), start);
            }
        }
        result
    }

    fn apply(&self, desired: DesiredSlots, request_host: &str) -> Result<Configuration, PanelError> {
        let host = normalize_host(request_host)?;
        let next = desired.into_configuration()?;
        let previous = self.store.load()?;

        let artifacts = render::render_all(&next, &self.render_context(&host), Uuid::new_v4())?;

        write_atomic(&self.artifacts.nginx_conf, artifacts.routing.as_bytes())?;
        write_atomic(&self.artifacts.compose_override, artifacts.orchestration.as_bytes())?;
        self.store.save(&next)?;

        let changed: Vec<&str> = previous
            .changed_slots(&next)
            .iter()
            .map(SlotName::as_str)
            .collect();
        tracing::info!(
            host = %host,
            configured_slots = next.configured_count(),
            changed = ?changed,
            "Configuration updated"
        );
        Ok(next)
    }

    fn render_context<'a>(&'a self, host: &'a str) -> RenderContext<'a> {
        RenderContext {
            host,
            database: &self.database,
            images: &self.images,
        }
    }
}

/// Reduce a `Host` header value to a bare lowercase host name.
///
/// Drops a trailing `:port`; bracketed IPv6 literals are rejected.
pub fn normalize_host(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    let host = match trimmed.rsplit_once(':') {
        Some((host, port)) if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => trimmed,
    };
    let host = host.trim_end_matches('.').to_ascii_lowercase();

    let valid = !host.is_empty()
        && host.len() <= 253
        && !host.starts_with(['.', '-'])
        && host
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '-'));
    if valid {
        Ok(host)
    } else {
        Err(ValidationError::InvalidHost(raw.to_string()))
    }
}
