//! Reader for SWOT PIXC (pixel cloud) data.
//!
//! Two input forms produce the same validated [`PointCloud`]:
//!
//! - NetCDF-4 granules as distributed by PO.DAAC, read from the
//!   `pixel_cloud` group. Needs the `netcdf` cargo feature (and libnetcdf);
//!   without it the NetCDF entry points return [`PixcError::Unsupported`].
//! - Columnar JSON with one array per variable, the shape HTTP clients send.
//!
//! # Variables
//!
//! `latitude`, `longitude`, `height`, `water_frac`, `coherent_power`,
//! `classification`, `missed_detection_rate`, `geolocation_qual`.

pub mod columns;
pub mod error;
#[cfg(feature = "netcdf")]
pub mod native;

use std::io::Read;
use std::path::Path;

use river_core::{PointCloud, RawPointCloud};
use swath_common::PipelineError;

pub use columns::{Column, PixcColumns};
pub use error::{PixcError, PixcResult};

/// Input encodings recognised by [`sniff_format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixcFormat {
    /// NetCDF-4 (HDF5 container) or NetCDF classic.
    NetCdf,
    Json,
}

const HDF5_SIGNATURE: &[u8] = b"\x89HDF\r\n\x1a\n";

/// Guess the encoding from the leading bytes.
pub fn sniff_format(data: &[u8]) -> Option<PixcFormat> {
    if data.starts_with(HDF5_SIGNATURE) || data.starts_with(b"CDF\x01") || data.starts_with(b"CDF\x02") {
        return Some(PixcFormat::NetCdf);
    }
    match data.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'{') => Some(PixcFormat::Json),
        _ => None,
    }
}

/// Read the pixel cloud of a PIXC granule on disk.
pub fn read_pixel_cloud(path: &Path) -> PixcResult<PointCloud> {
    #[cfg(feature = "netcdf")]
    {
        native::read_pixel_cloud(path)
    }
    #[cfg(not(feature = "netcdf"))]
    {
        Err(PixcError::Unsupported(format!(
            "cannot read {}: built without NetCDF support",
            path.display()
        )))
    }
}

/// Read the pixel cloud of a PIXC granule held in memory.
pub fn read_pixel_cloud_bytes(data: &[u8]) -> PixcResult<PointCloud> {
    #[cfg(feature = "netcdf")]
    {
        native::read_pixel_cloud_bytes(data)
    }
    #[cfg(not(feature = "netcdf"))]
    {
        let _ = data;
        Err(PixcError::Unsupported(
            "built without NetCDF support".to_string(),
        ))
    }
}

/// Read a columnar JSON point cloud.
pub fn read_point_cloud_json<R: Read>(reader: R) -> PixcResult<PointCloud> {
    let raw: RawPointCloud =
        serde_json::from_reader(reader).map_err(|e| PipelineError::InputSchema {
            field: "point_cloud".to_string(),
            message: e.to_string(),
        })?;
    Ok(PointCloud::try_from(raw)?)
}

/// Read a point cloud file, choosing the decoder from its contents.
pub fn read_point_cloud_file(path: &Path) -> PixcResult<PointCloud> {
    let data = std::fs::read(path)?;
    match sniff_format(&data) {
        Some(PixcFormat::Json) => read_point_cloud_json(data.as_slice()),
        Some(PixcFormat::NetCdf) => read_pixel_cloud(path),
        None => Err(PixcError::InvalidFormat(format!(
            "{} is neither NetCDF nor JSON",
            path.display()
        ))),
    }
}

/// Decodes downloaded granule bytes into a point cloud.
pub trait PixelCloudSource: Send + Sync {
    fn read_bytes(&self, data: &[u8]) -> PixcResult<PointCloud>;
}

/// [`PixelCloudSource`] for PIXC NetCDF granules.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetCdfPixelCloud;

impl PixelCloudSource for NetCdfPixelCloud {
    fn read_bytes(&self, data: &[u8]) -> PixcResult<PointCloud> {
        read_pixel_cloud_bytes(data)
    }
}

/// [`PixelCloudSource`] accepting columnar JSON as well as NetCDF.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyPixelCloud;

impl PixelCloudSource for AnyPixelCloud {
    fn read_bytes(&self, data: &[u8]) -> PixcResult<PointCloud> {
        match sniff_format(data) {
            Some(PixcFormat::Json) => read_point_cloud_json(data),
            Some(PixcFormat::NetCdf) => read_pixel_cloud_bytes(data),
            None => Err(PixcError::InvalidFormat(
                "payload is neither NetCDF nor JSON".to_string(),
            )),
        }
    }
}
