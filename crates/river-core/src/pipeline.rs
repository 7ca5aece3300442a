//! End-to-end projection run: the single entry point every adapter calls.

use projection::PlanarTransform;
use serde::{Deserialize, Serialize};
use swath_common::{BoundingBox, CrsCode, PipelineError, PipelineResult};
use tracing::debug;

use crate::centerline::LineGeometry;
use crate::clip::clip;
use crate::corridor::Corridor;
use crate::densify::densify;
use crate::input::PointCloud;
use crate::merge::{merge, ProjectedRecord};
use crate::nearest::{Nearest, StationIndex};

/// Tunables for one run, both in planar metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionParams {
    pub buffer_distance: f64,
    pub spacing: f64,
}

impl ProjectionParams {
    pub fn new(buffer_distance: f64, spacing: f64) -> PipelineResult<Self> {
        let params = Self {
            buffer_distance,
            spacing,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if !self.spacing.is_finite() || self.spacing <= 0.0 {
            return Err(PipelineError::parameter(
                "spacing",
                self.spacing,
                "must be a finite value > 0",
            ));
        }
        if !self.buffer_distance.is_finite() || self.buffer_distance < 0.0 {
            return Err(PipelineError::parameter(
                "buffer_distance",
                self.buffer_distance,
                "must be a finite value >= 0",
            ));
        }
        Ok(())
    }
}

/// Records of one run plus the summary adapters report alongside them.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectionOutcome {
    pub records: Vec<ProjectedRecord>,
    pub crs: CrsCode,
    pub input_count: usize,
    pub clipped_count: usize,
    pub station_count: usize,
}

/// Resolve the UTM zone covering the inputs, then project.
///
/// The zone comes from the center of the combined extent of the point cloud
/// and the centerline.
pub fn project_points(
    cloud: &PointCloud,
    centerline: &LineGeometry,
    params: &ProjectionParams,
) -> PipelineResult<ProjectionOutcome> {
    params.validate()?;
    let extent = combined_extent(cloud, centerline)?;
    let transform = projection::utm_for_extent(&extent)
        .map_err(|e| PipelineError::Projection(e.to_string()))?;
    debug!(crs = %transform.crs, "Resolved planar CRS");
    project_points_with(cloud, centerline, params, &transform)
}

fn combined_extent(cloud: &PointCloud, centerline: &LineGeometry) -> PipelineResult<BoundingBox> {
    let line_extent = centerline
        .extent()
        .ok_or_else(|| PipelineError::Geometry("centerline has no vertices".to_string()))?;
    Ok(match cloud.extent() {
        Some(cloud_extent) => line_extent.union(&cloud_extent),
        None => line_extent,
    })
}

/// Project with an explicit planar transform.
pub fn project_points_with<T: PlanarTransform + ?Sized>(
    cloud: &PointCloud,
    centerline: &LineGeometry,
    params: &ProjectionParams,
    transform: &T,
) -> PipelineResult<ProjectionOutcome> {
    params.validate()?;

    let planar_parts: Vec<Vec<(f64, f64)>> = centerline
        .parts()
        .iter()
        .map(|part| {
            part.iter()
                .map(|&(lon, lat)| transform.forward(lon, lat))
                .collect()
        })
        .collect();
    check_planar(&planar_parts)?;

    let stations = densify(&planar_parts, params.spacing)?;
    debug!(parts = planar_parts.len(), stations = stations.len(), "Densified centerline");

    let corridor = Corridor::build(&planar_parts, params.buffer_distance, transform)?;
    let clipped = clip(cloud, &corridor);
    debug!(
        input = cloud.len(),
        clipped = clipped.len(),
        polygons = corridor.polygons().len(),
        "Clipped point cloud to corridor"
    );

    let index = StationIndex::build(&stations);
    let matches: Vec<Option<Nearest>> = clipped
        .iter()
        .map(|&i| {
            let r = cloud.record(i);
            let (x, y) = transform.forward(r.longitude, r.latitude);
            index.nearest(x, y)
        })
        .collect();

    let records = merge(cloud, &clipped, &matches, &stations)?;
    debug!(records = records.len(), "Projected points onto stations");

    Ok(ProjectionOutcome {
        records,
        crs: transform.crs(),
        input_count: cloud.len(),
        clipped_count: clipped.len(),
        station_count: stations.len(),
    })
}

fn check_planar(parts: &[Vec<(f64, f64)>]) -> PipelineResult<()> {
    let bad = parts
        .iter()
        .flatten()
        .any(|(x, y)| !x.is_finite() || !y.is_finite());
    if bad {
        return Err(PipelineError::Projection(
            "centerline vertex projects to a non-finite planar position".to_string(),
        ));
    }
    Ok(())
}
