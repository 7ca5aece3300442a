//! Geographic <-> planar coordinate transformations.

use swath_common::CrsCode;

/// A locally distance-preserving mapping between geographic and planar coordinates.
///
/// Geographic coordinates are `(lon, lat)` in degrees; planar coordinates are
/// `(x, y)` in the linear unit of the CRS (meters for UTM).
pub trait PlanarTransform {
    /// The planar CRS produced by `forward`.
    fn crs(&self) -> CrsCode;

    /// Geographic `(lon, lat)` to planar `(x, y)`.
    fn forward(&self, lon: f64, lat: f64) -> (f64, f64);

    /// Planar `(x, y)` to geographic `(lon, lat)`.
    fn inverse(&self, x: f64, y: f64) -> (f64, f64);
}
