//! SWOT granule discovery and retrieval.
//!
//! [`CmrClient`] searches NASA CMR for PIXC granules intersecting an area and
//! time window, and downloads granules with retry. Services depend on the
//! [`GranuleFetcher`] trait so tests can substitute canned responses.

pub mod cmr;
pub mod download;
pub mod error;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::{info, instrument};

pub use cmr::{CmrConfig, GranuleFeed, GranuleQuery};
pub use download::RetryPolicy;
pub use error::{CatalogError, CatalogResult};

/// Search and download of granules.
#[async_trait]
pub trait GranuleFetcher: Send + Sync {
    async fn search(&self, query: &GranuleQuery) -> CatalogResult<GranuleFeed>;

    async fn download(&self, url: &str) -> CatalogResult<Bytes>;
}

/// [`GranuleFetcher`] backed by the CMR search API and HTTPS downloads.
pub struct CmrClient {
    client: Client,
    config: CmrConfig,
    retry: RetryPolicy,
    /// Earthdata Login bearer token sent with downloads.
    token: Option<String>,
}

impl CmrClient {
    pub fn new(
        config: CmrConfig,
        retry: RetryPolicy,
        token: Option<String>,
        request_timeout: Duration,
    ) -> CatalogResult<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(4)
            .build()?;

        Ok(Self {
            client,
            config,
            retry,
            token,
        })
    }

    pub fn config(&self) -> &CmrConfig {
        &self.config
    }
}

#[async_trait]
impl GranuleFetcher for CmrClient {
    #[instrument(skip(self), fields(bbox = %query.bbox().to_bbox_string()))]
    async fn search(&self, query: &GranuleQuery) -> CatalogResult<GranuleFeed> {
        query.validate()?;
        let feed = cmr::collect_pages(self.config.page_size, self.config.max_pages, |page_num| {
            cmr::fetch_page(&self.client, &self.config, query, page_num)
        })
        .await?;
        info!(granules = feed.len(), "CMR search completed");
        Ok(feed)
    }

    async fn download(&self, url: &str) -> CatalogResult<Bytes> {
        download::download(&self.client, url, self.token.as_deref(), &self.retry).await
    }
}
