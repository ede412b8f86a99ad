//! Prometheus metrics for upstream fetches and loader batches.
//!
//! Recording is always safe: without an installed recorder the `metrics`
//! macros are no-ops, so library code and tests never need to call `init`.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fmt;
use std::sync::OnceLock;
use tracing::info;

use crate::types::LoadResult;

/// All metric names used in the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    FetchTotal,
    FetchDuration,
    LoadBatches,
    LoadDemoFallbacks,
    LoadItems,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::FetchTotal => "apod_fetch_total",
            MetricName::FetchDuration => "apod_fetch_duration_seconds",
            MetricName::LoadBatches => "apod_load_batches_total",
            MetricName::LoadDemoFallbacks => "apod_load_demo_fallbacks_total",
            MetricName::LoadItems => "apod_load_items",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Calling it twice is an error.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;
    METRICS_HANDLE
        .set(handle)
        .map_err(|_| "Prometheus recorder already installed")?;
    info!("Metrics recorder installed");
    Ok(())
}

/// Rendered exposition text, if the recorder is installed.
pub fn render() -> Option<String> {
    METRICS_HANDLE.get().map(|handle| handle.render())
}

pub mod fetch {
    use super::MetricName;

    pub fn outcome(label: &'static str, secs: f64) {
        ::metrics::counter!(MetricName::FetchTotal.as_str(), "outcome" => label).increment(1);
        ::metrics::histogram!(MetricName::FetchDuration.as_str()).record(secs);
    }
}

pub mod loader {
    use super::{LoadResult, MetricName};

    pub fn batch(result: &LoadResult, demo_fallback: bool) {
        let outcome = result.error.as_ref().map(|e| e.kind.as_str()).unwrap_or("ok");
        ::metrics::counter!(MetricName::LoadBatches.as_str(), "error" => outcome).increment(1);
        ::metrics::histogram!(MetricName::LoadItems.as_str()).record(result.apods.len() as f64);
        if demo_fallback {
            ::metrics::counter!(MetricName::LoadDemoFallbacks.as_str()).increment(1);
        }
    }
}
