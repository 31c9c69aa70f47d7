//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use tempfile::TempDir;
use tokio::net::TcpListener;

use slot_panel::config::{PanelConfig, PanelContext};
use slot_panel::http::HttpServer;
use slot_panel::lifecycle::Shutdown;
use slot_panel::slots::{ConfigurationService, DesiredSlots, SlotName, SlotTriple};

/// A running panel on an ephemeral port, backed by a temporary state dir.
pub struct TestPanel {
    pub addr: SocketAddr,
    pub dir: TempDir,
    pub service: Arc<ConfigurationService>,
    shutdown: Shutdown,
}

impl TestPanel {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn context(&self) -> PanelContext {
        PanelContext::in_dir(self.dir.path())
    }
}

impl Drop for TestPanel {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Service over a fresh temporary state directory.
pub fn service_in_tempdir() -> (TempDir, ConfigurationService) {
    let dir = tempfile::tempdir().unwrap();
    let service = ConfigurationService::new(PanelContext::in_dir(dir.path()));
    (dir, service)
}

/// Start the full router on 127.0.0.1:0.
pub async fn start_panel() -> TestPanel {
    let dir = tempfile::tempdir().unwrap();
    let mut config = PanelConfig::default();
    config.paths.state_dir = dir.path().to_string_lossy().into_owned();

    let service = Arc::new(ConfigurationService::new(PanelContext::from_config(&config)));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, service.clone());
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    TestPanel {
        addr,
        dir,
        service,
        shutdown,
    }
}

/// Every slot absent.
pub fn all_absent() -> DesiredSlots {
    SlotName::ALL
        .into_iter()
        .map(|slot| (slot.to_string(), None))
        .collect()
}

/// Every slot absent except the given ones.
pub fn desired(configured: &[(SlotName, SlotTriple)]) -> DesiredSlots {
    let mut desired = all_absent();
    for (slot, triple) in configured {
        desired.insert(slot.as_str(), Some(triple.clone()));
    }
    desired
}

/// Form fields for all six slots, every database unset.
pub fn blank_form() -> Vec<(String, String)> {
    SlotName::ALL
        .into_iter()
        .flat_map(|slot| {
            [
                (format!("{slot}-sp7-tag"), String::new()),
                (format!("{slot}-sp6-tag"), String::new()),
                (format!("{slot}-db"), "None".to_string()),
            ]
        })
        .collect()
}

/// Overwrite a form field.
pub fn set_field(form: &mut [(String, String)], key: &str, value: &str) {
    let entry = form.iter_mut().find(|(k, _)| k == key).unwrap();
    entry.1 = value.to_string();
}
