//! Projection of swath pixel clouds onto a river centerline.
//!
//! A run takes a columnar point cloud in geographic coordinates and a
//! centerline, then:
//!
//! 1. resolves a UTM zone for the inputs
//! 2. densifies the centerline into stations at a fixed spacing
//! 3. buffers the centerline into a corridor and keeps the points inside it
//! 4. assigns each kept point the cumulative distance of its nearest station
//!
//! Everything is synchronous and owned by the caller; adapters decide where
//! the work runs.

pub mod centerline;
pub mod clip;
pub mod corridor;
pub mod densify;
pub mod input;
pub mod merge;
pub mod nearest;
pub mod pipeline;

pub use centerline::LineGeometry;
pub use corridor::Corridor;
pub use densify::Station;
pub use input::{PointCloud, PointRecord, RawPointCloud};
pub use merge::ProjectedRecord;
pub use nearest::{Nearest, StationIndex};
pub use pipeline::{project_points, project_points_with, ProjectionOutcome, ProjectionParams};

pub use swath_common::{PipelineError, PipelineResult};
