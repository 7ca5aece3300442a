//! HTTP request handlers.

pub mod download;
pub mod health;
pub mod process;
pub mod query;

use river_core::{project_points, LineGeometry, PointCloud, ProjectedRecord};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::context::ProcessContext;
use crate::error::ApiError;
use crate::metrics::ApiMetrics;

/// Body of a successful processing request.
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub request_id: Uuid,
    pub crs: String,
    pub input_count: usize,
    pub clipped_count: usize,
    pub station_count: usize,
    pub records: Vec<ProjectedRecord>,
}

/// Run a projection on the blocking pool.
///
/// Either the whole outcome or the error comes back; nothing is logged about
/// records of a failed run.
pub(crate) async fn run_projection(
    ctx: ProcessContext,
    cloud: PointCloud,
    centerline: LineGeometry,
) -> Result<ProcessResponse, ApiError> {
    let params = ctx.params;
    let outcome = tokio::task::spawn_blocking(move || project_points(&cloud, &centerline, &params))
        .await
        .map_err(|e| ApiError::Internal(format!("projection task failed: {}", e)))??;

    let duration_ms = ctx.elapsed_ms();
    ApiMetrics::record_process(outcome.input_count, outcome.clipped_count, duration_ms);
    info!(
        request_id = %ctx.request_id,
        crs = %outcome.crs,
        input = outcome.input_count,
        clipped = outcome.clipped_count,
        stations = outcome.station_count,
        duration_ms,
        "Projection completed"
    );

    Ok(ProcessResponse {
        request_id: ctx.request_id,
        crs: outcome.crs.to_string(),
        input_count: outcome.input_count,
        clipped_count: outcome.clipped_count,
        station_count: outcome.station_count,
        records: outcome.records,
    })
}
