//! Granule download endpoints.
//!
//! `GET /download` proxies a granule to the client; `POST
//! /download-and-process` fetches it and runs the projection server-side.

use std::sync::Arc;

use axum::extract::{
    rejection::{JsonRejection, QueryRejection},
    Extension, Query,
};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use reqwest::Url;
use river_core::LineGeometry;
use serde::Deserialize;
use tracing::{info, instrument};

use super::{run_projection, ProcessResponse};
use crate::context::ProcessContext;
use crate::error::ApiError;
use crate::metrics::ApiMetrics;
use crate::state::AppState;

pub const NETCDF_CONTENT_TYPE: &str = "application/x-netcdf";
pub const DOWNLOAD_FILENAME: &str = "SWOT_data.nc";

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DownloadProcessRequest {
    pub url: String,
    pub centerline: serde_json::Value,
    pub buffer_distance: Option<f64>,
    pub spacing: Option<f64>,
}

/// Check a granule URL against the scheme and host allow-list.
pub fn validate_url(state: &AppState, raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw)
        .map_err(|e| ApiError::bad_request("InvalidUrl", format!("Invalid URL {}: {}", raw, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::bad_request(
            "InvalidUrl",
            format!("Unsupported URL scheme: {}", url.scheme()),
        ));
    }
    let host = url.host_str().unwrap_or_default();
    if !state.config.download.is_allowed_host(host) {
        return Err(ApiError::bad_request(
            "InvalidUrl",
            format!("Host not allowed: {}", host),
        ));
    }
    Ok(url)
}

async fn fetch_granule(state: &AppState, raw: &str) -> Result<Bytes, ApiError> {
    let url = validate_url(state, raw)?;
    let data = state.fetcher.download(url.as_str()).await?;
    ApiMetrics::record_download(data.len());
    info!(url = %url, bytes = data.len(), "Granule downloaded");
    Ok(data)
}

/// GET /download?url=...
#[instrument(skip_all)]
pub async fn download_handler(
    Extension(state): Extension<Arc<AppState>>,
    params: Result<Query<DownloadParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    ApiMetrics::record_request("download");
    let Query(params) = params?;
    let url = match params.url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => return Err(ApiError::bad_request("MissingUrl", "No URL provided")),
    };

    let data = fetch_granule(&state, &url).await?;
    Ok((
        [
            (header::CONTENT_TYPE, NETCDF_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", DOWNLOAD_FILENAME),
            ),
        ],
        data,
    )
        .into_response())
}

/// POST /download-and-process
#[instrument(skip_all)]
pub async fn download_and_process_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<DownloadProcessRequest>, JsonRejection>,
) -> Result<Json<ProcessResponse>, ApiError> {
    ApiMetrics::record_request("download_and_process");
    let Json(request) = payload?;

    let params = state
        .config
        .processing
        .resolve(request.buffer_distance, request.spacing)?;
    let ctx = ProcessContext::new(params);
    let centerline = LineGeometry::from_geojson_value(request.centerline)?;

    let data = fetch_granule(&state, &request.url).await?;
    let source = Arc::clone(&state.source);
    let cloud = tokio::task::spawn_blocking(move || source.read_bytes(&data))
        .await
        .map_err(|e| ApiError::Internal(format!("granule decode task failed: {}", e)))??;

    Ok(Json(run_projection(ctx, cloud, centerline).await?))
}
