use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Local stand-in for the enrollment backend.
///
/// Accepts any well-formed submission from a device presenting the expected key and mints a
/// fresh continuation token for it.
#[derive(Clone)]
pub(crate) struct StubBackend {
    device_key: Arc<str>,
    processed: Arc<AtomicU64>,
}

impl StubBackend {
    pub(crate) fn new(device_key: impl Into<Arc<str>>) -> Self {
        Self {
            device_key: device_key.into(),
            processed: Arc::new(AtomicU64::new(0)),
        }
    }

    pub(crate) fn accepts_device_key(&self, presented: &str) -> bool {
        presented == &*self.device_key
    }

    pub(crate) fn mint_scan_result_blob(&self) -> String {
        let sequence = self.processed.fetch_add(1, Ordering::Relaxed) + 1;
        format!("stub-{sequence:06}-{}", uuid::Uuid::new_v4().simple())
    }

    pub(crate) fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }
}
