//! slot-panel: web panel that assigns application versions and databases to
//! a fixed set of server slots.
//!
//! # Architecture Overview
//!
//! ```text
//!     Browser / panel-cli
//!     ──────────────────────▶ http (axum router, forms, JSON)
//!                                  │
//!                                  ▼ spawn_blocking
//!                             slots::ConfigurationService
//!                              │          │            │
//!                              ▼          ▼            ▼
//!                         JsonFileStore  render     write_atomic
//!                         (state.json)   (pure)     nginx.conf
//!                                                   docker-compose.override.yml
//! ```
//!
//! Cross-cutting: config (TOML + env), observability (tracing, Prometheus),
//! lifecycle (signals, graceful shutdown).

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use slot_panel::config::{load_or_default, PanelContext};
use slot_panel::http::HttpServer;
use slot_panel::lifecycle::{signals, Shutdown};
use slot_panel::observability::{logging, metrics};
use slot_panel::slots::ConfigurationService;

#[derive(Parser)]
#[command(name = "slot-panel", version, about = "Server slot configuration panel")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "SLOT_PANEL_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_or_default(args.config.as_deref())?;

    logging::init(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "slot-panel starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let context = PanelContext::from_config(&config);
    tracing::info!(
        bind_address = %config.listener.bind_address,
        snapshot = %context.snapshot_path.display(),
        nginx_conf = %context.artifacts.nginx_conf.display(),
        compose_override = %context.artifacts.compose_override.display(),
        database_host = %config.database.host,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let service = Arc::new(ConfigurationService::new(context));
    match service.get_current() {
        Ok(current) => {
            metrics::record_configured_slots(current.configured_count());
            tracing::info!(configured = current.configured_count(), "Snapshot loaded");
        }
        Err(e) => tracing::warn!(error = %e, "Snapshot unreadable; updates will fail until repaired"),
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Arc::new(Shutdown::new());
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config, service);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
