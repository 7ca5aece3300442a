//! `POST /query`: search CMR for granules.

use std::sync::Arc;

use axum::extract::{rejection::JsonRejection, Extension};
use axum::Json;
use granule_catalog::{GranuleFeed, GranuleQuery};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::metrics::ApiMetrics;
use crate::state::AppState;

#[instrument(skip_all)]
pub async fn query_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<GranuleQuery>, JsonRejection>,
) -> Result<Json<GranuleFeed>, ApiError> {
    ApiMetrics::record_request("query");
    let Json(query) = payload?;

    let feed = state.fetcher.search(&query).await?;
    ApiMetrics::record_search(feed.len());
    info!(
        bbox = %query.bbox().to_bbox_string(),
        granules = feed.len(),
        "Granule query completed"
    );
    Ok(Json(feed))
}
