//! Application state shared by all handlers.

use std::sync::Arc;

use granule_catalog::GranuleFetcher;
use metrics_exporter_prometheus::PrometheusHandle;
use pixc_reader::PixelCloudSource;

use crate::config::ApiConfig;

/// Shared application state.
pub struct AppState {
    pub config: ApiConfig,

    /// Granule search and download.
    pub fetcher: Arc<dyn GranuleFetcher>,

    /// Decoder for downloaded granules.
    pub source: Arc<dyn PixelCloudSource>,

    /// Renders `/metrics`; `None` when no recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        config: ApiConfig,
        fetcher: Arc<dyn GranuleFetcher>,
        source: Arc<dyn PixelCloudSource>,
    ) -> Self {
        Self {
            config,
            fetcher,
            source,
            prometheus: None,
        }
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}
