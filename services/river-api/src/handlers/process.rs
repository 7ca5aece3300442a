//! `POST /process`: project a client-supplied point cloud.

use std::sync::Arc;

use axum::extract::{rejection::JsonRejection, Extension};
use axum::Json;
use river_core::{LineGeometry, PointCloud, RawPointCloud};
use serde::Deserialize;
use tracing::instrument;

use super::{run_projection, ProcessResponse};
use crate::context::ProcessContext;
use crate::error::ApiError;
use crate::metrics::ApiMetrics;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessRequest {
    pub point_cloud: RawPointCloud,
    /// GeoJSON FeatureCollection, Feature or geometry.
    pub centerline: serde_json::Value,
    pub buffer_distance: Option<f64>,
    pub spacing: Option<f64>,
}

#[instrument(skip_all)]
pub async fn process_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<ProcessResponse>, ApiError> {
    ApiMetrics::record_request("process");
    let Json(request) = payload?;

    let params = state
        .config
        .processing
        .resolve(request.buffer_distance, request.spacing)?;
    let ctx = ProcessContext::new(params);

    let cloud = PointCloud::try_from(request.point_cloud)?;
    let centerline = LineGeometry::from_geojson_value(request.centerline)?;

    Ok(Json(run_projection(ctx, cloud, centerline).await?))
}
