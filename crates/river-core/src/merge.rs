//! Joins clipped records with their nearest-station results.

use serde::Serialize;
use swath_common::{PipelineError, PipelineResult};

use crate::densify::Station;
use crate::input::{PointCloud, PointRecord};
use crate::nearest::Nearest;

/// A point record positioned along the centerline.
///
/// Serializes flat: the point fields followed by the projection fields, with
/// scalars only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectedRecord {
    #[serde(flatten)]
    pub record: PointRecord,
    pub nearest_station_index: usize,
    pub distance_to_nearest: f64,
    #[serde(rename = "cumulative_distance")]
    pub nearest_cumulative_distance: f64,
    /// Spacing between the matched station and its predecessor.
    pub distance_to_prev: f64,
    /// Position of the record in the input cloud.
    #[serde(skip)]
    pub source_index: usize,
}

/// Build one output record per clipped point.
///
/// `clipped` and `matches` are parallel; `stations` is indexed by
/// `Nearest::station_index`. Every clipped point must have a match, so the
/// output always has exactly `clipped.len()` records.
pub fn merge(
    cloud: &PointCloud,
    clipped: &[usize],
    matches: &[Option<Nearest>],
    stations: &[Station],
) -> PipelineResult<Vec<ProjectedRecord>> {
    if clipped.len() != matches.len() {
        return Err(PipelineError::Projection(format!(
            "{} clipped points but {} nearest-station results",
            clipped.len(),
            matches.len()
        )));
    }

    clipped
        .iter()
        .zip(matches)
        .map(|(&source_index, hit)| {
            let (hit, station) = hit
                .as_ref()
                .and_then(|hit| stations.get(hit.station_index).map(|s| (hit, s)))
                .ok_or_else(|| {
                    PipelineError::Projection(format!(
                        "no nearest station for point {}",
                        source_index
                    ))
                })?;
            Ok(ProjectedRecord {
                record: cloud.record(source_index),
                nearest_station_index: hit.station_index,
                distance_to_nearest: hit.distance,
                nearest_cumulative_distance: station.cumulative_distance,
                distance_to_prev: station.distance_to_prev,
                source_index,
            })
        })
        .collect()
}
