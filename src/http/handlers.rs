//! Route handlers.
//!
//! Each handler extracts its inputs, runs the service call on the blocking
//! pool and maps `PanelError` into an `ApiError` response.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::Redirect,
    Form, Json,
};
use serde::{Deserialize, Serialize};

use crate::http::error::ApiError;
use crate::http::forms::SlotForm;
use crate::http::server::AppState;
use crate::slots::{Artifacts, Configuration, DesiredSlots, PanelError, SlotName};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SlotDatabase {
    pub slot: SlotName,
    pub database: Option<String>,
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn get_state(State(state): State<AppState>) -> Result<Json<Configuration>, ApiError> {
    let service = state.service.clone();
    let config = run_blocking(move || service.get_current()).await?;
    Ok(Json(config))
}

pub async fn put_state(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(desired): Json<DesiredSlots>,
) -> Result<Json<Configuration>, ApiError> {
    let host = request_host(&headers);
    let service = state.service.clone();
    let config = run_blocking(move || service.update(desired, &host)).await?;
    Ok(Json(config))
}

/// Form submission from the editing view; redirects to the display view.
pub async fn submit_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<SlotForm>,
) -> Result<Redirect, ApiError> {
    let host = request_host(&headers);
    let desired = DesiredSlots::from(form);
    let service = state.service.clone();
    run_blocking(move || service.update(desired, &host)).await?;
    Ok(Redirect::to("/"))
}

pub async fn get_slot_database(
    State(state): State<AppState>,
    Path(slot): Path<String>,
) -> Result<Json<SlotDatabase>, ApiError> {
    let slot: SlotName = slot.parse()?;
    let service = state.service.clone();
    let database = run_blocking(move || service.database_for(slot)).await?;
    Ok(Json(SlotDatabase { slot, database }))
}

pub async fn preview(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Artifacts>, ApiError> {
    let host = request_host(&headers);
    let service = state.service.clone();
    let artifacts = run_blocking(move || service.render_preview(&host)).await?;
    Ok(Json(artifacts))
}

fn request_host(headers: &HeaderMap) -> String {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Run a service call on the blocking pool; the service does file I/O.
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, PanelError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}
