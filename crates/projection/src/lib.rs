//! Planar projections for metric geometry work.
//!
//! Only Transverse Mercator is provided, parameterised by UTM zone. The
//! series expansions are evaluated directly; there is no PROJ dependency.

pub mod transform;
pub mod utm;

use swath_common::crs::CrsParseError;
use swath_common::{BoundingBox, CrsCode};

pub use transform::PlanarTransform;
pub use utm::TransverseMercator;

#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    #[error("Invalid UTM zone: {0}")]
    InvalidZone(u8),

    #[error("CRS is not a planar projection: {0}")]
    NotPlanar(String),

    #[error(transparent)]
    Crs(#[from] CrsParseError),
}

/// Resolve the UTM projection for a geographic extent.
pub fn utm_for_extent(extent: &BoundingBox) -> Result<TransverseMercator, ProjectionError> {
    let crs = CrsCode::utm_for_extent(extent)?;
    TransverseMercator::from_crs(crs)
}
