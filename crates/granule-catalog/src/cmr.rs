//! Granule search against NASA's Common Metadata Repository (CMR).
//!
//! Searches page through `granules.json` until a page comes back empty or
//! shorter than the page size, and return every entry in one feed.

use std::future::Future;

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use swath_common::BoundingBox;
use tracing::debug;

use crate::error::{CatalogError, CatalogResult};

/// Public CMR granule search endpoint.
pub const DEFAULT_SEARCH_URL: &str = "https://cmr.earthdata.nasa.gov/search/granules.json";

/// SWOT Level 2 HR PIXC collection on PO.DAAC.
pub const SWOT_PIXC_COLLECTION: &str = "C2799438266-POCLOUD";

/// Largest page size CMR accepts.
pub const DEFAULT_PAGE_SIZE: u32 = 2000;

/// Search endpoint and collection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CmrConfig {
    pub search_url: String,
    pub collection_concept_id: String,
    pub page_size: u32,
    /// Stop after this many pages even if more remain.
    pub max_pages: u32,
}

impl Default for CmrConfig {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            collection_concept_id: SWOT_PIXC_COLLECTION.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: 50,
        }
    }
}

/// Spatial and temporal search window, as sent by clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GranuleQuery {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
    /// RFC 3339 timestamp, e.g. `2024-03-01T00:00:00Z`.
    pub start_date: String,
    pub end_date: String,
}

impl GranuleQuery {
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(self.min_lng, self.min_lat, self.max_lng, self.max_lat)
    }

    pub fn validate(&self) -> CatalogResult<()> {
        let bbox = self.bbox();
        if !bbox.is_valid_geographic() {
            return Err(CatalogError::InvalidQuery(format!(
                "bounding box {} is not a valid lon/lat extent",
                bbox.to_bbox_string()
            )));
        }

        let start = DateTime::parse_from_rfc3339(&self.start_date).map_err(|e| {
            CatalogError::InvalidQuery(format!("start_date '{}': {}", self.start_date, e))
        })?;
        let end = DateTime::parse_from_rfc3339(&self.end_date).map_err(|e| {
            CatalogError::InvalidQuery(format!("end_date '{}': {}", self.end_date, e))
        })?;
        if end < start {
            return Err(CatalogError::InvalidQuery(
                "end_date is before start_date".to_string(),
            ));
        }
        Ok(())
    }

    /// CMR query parameters for one page.
    pub fn to_params(&self, config: &CmrConfig, page_num: u32) -> Vec<(&'static str, String)> {
        vec![
            ("collection_concept_id", config.collection_concept_id.clone()),
            ("bounding_box", self.bbox().to_bbox_string()),
            ("temporal", format!("{},{}", self.start_date, self.end_date)),
            ("page_size", config.page_size.to_string()),
            ("page_num", page_num.to_string()),
        ]
    }
}

/// CMR search result: `{"feed": {"entry": [...]}}`.
///
/// Entries are passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GranuleFeed {
    pub feed: FeedBody,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedBody {
    #[serde(default)]
    pub entry: Vec<Value>,
}

impl GranuleFeed {
    pub fn from_entries(entry: Vec<Value>) -> Self {
        Self {
            feed: FeedBody { entry },
        }
    }

    pub fn len(&self) -> usize {
        self.feed.entry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feed.entry.is_empty()
    }

    /// NetCDF download links of every entry, in feed order, without duplicates.
    pub fn data_links(&self) -> Vec<String> {
        let mut links: Vec<String> = Vec::new();
        for entry in &self.feed.entry {
            let hrefs = entry
                .get("links")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(|link| link.get("href").and_then(Value::as_str));
            for href in hrefs {
                if href.ends_with(".nc") && !links.iter().any(|l| l == href) {
                    links.push(href.to_string());
                }
            }
        }
        links
    }
}

/// Fetch pages `1, 2, ...` with `fetch_page` and concatenate their entries.
///
/// Stops at the first empty page, the first page shorter than `page_size`, or
/// after `max_pages` pages.
pub async fn collect_pages<F, Fut>(
    page_size: u32,
    max_pages: u32,
    mut fetch_page: F,
) -> CatalogResult<GranuleFeed>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = CatalogResult<Vec<Value>>>,
{
    let mut results = Vec::new();
    for page_num in 1..=max_pages {
        let entries = fetch_page(page_num).await?;
        let count = entries.len();
        debug!(page_num, count, "Fetched CMR page");
        results.extend(entries);
        if count == 0 || count < page_size as usize {
            break;
        }
    }
    Ok(GranuleFeed::from_entries(results))
}

/// Request one search page and return its entries.
pub(crate) async fn fetch_page(
    client: &reqwest::Client,
    config: &CmrConfig,
    query: &GranuleQuery,
    page_num: u32,
) -> CatalogResult<Vec<Value>> {
    let response = client
        .get(&config.search_url)
        .query(&query.to_params(config, page_num))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(CatalogError::Status {
            status: status.as_u16(),
            url: config.search_url.clone(),
        });
    }

    let page: GranuleFeed = response
        .json()
        .await
        .map_err(|e| CatalogError::Decode(e.to_string()))?;
    Ok(page.feed.entry)
}
