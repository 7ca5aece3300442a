//! Native NetCDF-4 reading of SWOT PIXC granules.
//!
//! The measurements live in the `pixel_cloud` group. Each of the eight
//! variables is read in full as `f64` (libnetcdf converts from the stored
//! type) along with its `_FillValue`, `scale_factor` and `add_offset`.
//!
//! The netcdf library requires a file path, so in-memory granules are written
//! to a temp file first. On Linux `/dev/shm` is preferred.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Once;

use river_core::PointCloud;
use tracing::debug;

use crate::columns::{Column, PixcColumns};
use crate::error::{PixcError, PixcResult};

/// Group holding the per-pixel variables.
pub const PIXEL_CLOUD_GROUP: &str = "pixel_cloud";

/// Silence HDF5's automatic error printing to stderr.
///
/// Probing for optional attributes makes HDF5 print diagnostics even though
/// the absence is handled. Safe to call more than once.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and null handlers are a
        // documented way to disable error output.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Read the pixel cloud of a PIXC granule on disk.
pub fn read_pixel_cloud(path: &Path) -> PixcResult<PointCloud> {
    silence_hdf5_errors();

    let file = netcdf::open(path)
        .map_err(|e| PixcError::InvalidFormat(format!("Failed to open NetCDF: {}", e)))?;

    let group = file
        .group(PIXEL_CLOUD_GROUP)
        .map_err(|e| PixcError::InvalidFormat(format!("Failed to read groups: {}", e)))?
        .ok_or_else(|| PixcError::MissingData(format!("{} group", PIXEL_CLOUD_GROUP)))?;

    let columns = PixcColumns {
        latitude: read_column(&group, "latitude")?,
        longitude: read_column(&group, "longitude")?,
        height: read_column(&group, "height")?,
        water_frac: read_column(&group, "water_frac")?,
        coherent_power: read_column(&group, "coherent_power")?,
        classification: read_column(&group, "classification")?,
        missed_detection_rate: read_column(&group, "missed_detection_rate")?,
        geolocation_qual: read_column(&group, "geolocation_qual")?,
    };
    debug!(path = %path.display(), pixels = columns.latitude.values.len(), "Read pixel_cloud group");

    columns.into_point_cloud()
}

/// Read the pixel cloud of a PIXC granule held in memory.
pub fn read_pixel_cloud_bytes(data: &[u8]) -> PixcResult<PointCloud> {
    let temp = TempGranule::write(data)?;
    read_pixel_cloud(&temp.path)
}

fn read_column(group: &netcdf::Group, name: &str) -> PixcResult<Column> {
    let var = group
        .variable(name)
        .ok_or_else(|| PixcError::MissingData(format!("{}/{} variable", PIXEL_CLOUD_GROUP, name)))?;

    let values: Vec<f64> = var
        .get_values(..)
        .map_err(|e| PixcError::InvalidFormat(format!("Failed to read {}: {}", name, e)))?;

    let mut column = Column::new(values).with_packing(
        get_f64_attr(&var, "scale_factor").unwrap_or(1.0),
        get_f64_attr(&var, "add_offset").unwrap_or(0.0),
    );
    if let Some(fill) = get_f64_attr(&var, "_FillValue") {
        column = column.with_fill(fill);
    }
    Ok(column)
}

// =============================================================================
// Internal helpers
// =============================================================================

/// A granule written to a temp file, removed on drop.
struct TempGranule {
    path: PathBuf,
}

impl TempGranule {
    fn write(data: &[u8]) -> PixcResult<Self> {
        let path = get_optimal_temp_dir().join(generate_temp_filename());
        let mut file = std::fs::File::create(&path)?;
        let granule = Self { path };
        file.write_all(data)?;
        Ok(granule)
    }
}

impl Drop for TempGranule {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Memory-backed `/dev/shm` on Linux when writable, else the system temp dir.
fn get_optimal_temp_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        let shm_path = Path::new("/dev/shm");
        if shm_path.is_dir() {
            let test_path = shm_path.join(format!(".pixc_test_{}", std::process::id()));
            if std::fs::write(&test_path, b"test").is_ok() {
                let _ = std::fs::remove_file(&test_path);
                return shm_path.to_path_buf();
            }
        }
    }

    std::env::temp_dir()
}

/// Unique per process, thread and call.
fn generate_temp_filename() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let pid = std::process::id();
    let tid = std::thread::current().id();
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);

    format!("pixc_{}_{:?}_{}.nc", pid, tid, count)
}

/// Check for an attribute without triggering HDF5 error output.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimal_temp_dir() {
        assert!(get_optimal_temp_dir().exists());
    }

    #[test]
    fn test_temp_granule_removed_on_drop() {
        let path = {
            let temp = TempGranule::write(b"not a granule").unwrap();
            assert!(temp.path.exists());
            temp.path.clone()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let err = read_pixel_cloud_bytes(b"definitely not netcdf").unwrap_err();
        assert!(matches!(err, PixcError::InvalidFormat(_)));
    }
}
