//! Artifact rendering.
//!
//! # Data Flow
//! ```text
//! Configuration + RenderContext
//!     → routing.rs        (nginx server blocks, one per configured slot)
//!     → orchestration.rs  (docker-compose override, companions deduplicated)
//!     → Artifacts (two strings, written to disk by the service)
//! ```
//!
//! # Design Decisions
//! - Rendering is a pure function: no file access, no environment, no clock
//! - The restart token is an input, so the only nondeterminism lives in the caller
//! - Output follows fixed slot order and is byte-stable for identical input

pub mod orchestration;
pub mod routing;

use uuid::Uuid;

use crate::config::schema::{DatabaseConfig, ImageConfig};
use crate::slots::error::{RenderError, SlotField};
use crate::slots::model::{is_embeddable, Configuration, SlotName, SlotTriple};

pub use orchestration::render_orchestration;
pub use routing::render_routing;

/// First line of every generated file.
pub const GENERATED_HEADER: &str = "# Generated by slot-panel. Do not edit.";

/// Everything besides the configuration that rendering depends on.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Externally visible host name; slots are served as `<slot>.<host>`.
    pub host: &'a str,
    pub database: &'a DatabaseConfig,
    pub images: &'a ImageConfig,
}

/// Both rendered artifacts of one configuration.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Artifacts {
    pub routing: String,
    pub orchestration: String,
}

/// Render both artifacts.
pub fn render_all(
    config: &Configuration,
    ctx: &RenderContext<'_>,
    restart_token: Uuid,
) -> Result<Artifacts, RenderError> {
    Ok(Artifacts {
        routing: render_routing(config, ctx)?,
        orchestration: render_orchestration(config, ctx, restart_token)?,
    })
}

fn check_host(host: &str) -> Result<(), RenderError> {
    let ok = !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '-'));
    if ok {
        Ok(())
    } else {
        Err(RenderError::InvalidHost(host.to_string()))
    }
}

fn check_triple(slot: SlotName, triple: &SlotTriple) -> Result<(), RenderError> {
    let fields = [
        (SlotField::PrimaryTag, triple.primary_or_default()),
        (SlotField::CompanionTag, triple.companion_or_default()),
        (SlotField::Database, triple.database.as_str()),
    ];
    for (field, value) in fields {
        if !is_embeddable(field, value) {
            return Err(RenderError::InvalidValue {
                slot,
                field,
                value: value.to_string(),
            });
        }
    }
    Ok(())
}
