//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit, metrics)
//! - Bind server to listener and stop on the shutdown signal

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::PanelConfig;
use crate::http::handlers;
use crate::http::request::{propagate_request_id_layer, request_span, set_request_id_layer};
use crate::observability::metrics;
use crate::slots::ConfigurationService;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ConfigurationService>,
}

/// HTTP server for the panel.
pub struct HttpServer {
    router: Router,
    config: PanelConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: PanelConfig, service: Arc<ConfigurationService>) -> Self {
        let router = Self::build_router(&config, AppState { service });
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &PanelConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(handlers::get_state))
            .route("/health", get(handlers::health))
            .route("/api/state", get(handlers::get_state).put(handlers::put_state))
            .route("/api/preview", get(handlers::preview))
            .route("/api/slots/{slot}/database", get(handlers::get_slot_database))
            .route("/configure/update_state/", post(handlers::submit_form))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.listener.max_body_bytes))
            .layer(middleware::from_fn(track_requests))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(set_request_id_layer())
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &PanelConfig {
        &self.config
    }
}

async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let response = next.run(request).await;
    metrics::record_request(&method, response.status().as_u16(), start);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PanelContext;
    use axum::http::{header, Method, StatusCode};
    use tower::ServiceExt;

    fn router(dir: &std::path::Path, max_body_bytes: usize) -> Router {
        let mut config = PanelConfig::default();
        config.listener.max_body_bytes = max_body_bytes;
        let service = Arc::new(ConfigurationService::new(PanelContext::in_dir(dir)));
        HttpServer::build_router(&config, AppState { service })
    }

    #[tokio::test]
    async fn test_request_id_is_assigned() {
        let dir = tempfile::tempdir().unwrap();
        let response = router(dir.path(), 1024)
            .oneshot(axum::http::Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(crate::http::X_REQUEST_ID));
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!("db1-db={}", "x".repeat(4096));
        let request = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/configure/update_state/")
            .header(header::HOST, "panel.local")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();

        let response = router(dir.path(), 1024).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(!dir.path().join("nginx.conf").exists());
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let response = router(dir.path(), 1024)
            .oneshot(axum::http::Request::get("/admin").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
