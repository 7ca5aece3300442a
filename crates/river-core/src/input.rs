//! Point cloud input: raw columnar payloads and their validated form.
//!
//! A pixel cloud arrives as parallel arrays, one per variable. The raw shape
//! accepts any subset of fields so that a missing one can be reported by name
//! instead of surfacing as a generic deserialization failure.

use serde::{Deserialize, Serialize};
use swath_common::{BoundingBox, PipelineError, PipelineResult};

/// Names of the required point cloud fields, in validation order.
pub const POINT_CLOUD_FIELDS: [&str; 8] = [
    "latitude",
    "longitude",
    "height",
    "water_frac",
    "coherent_power",
    "classification",
    "missed_detection_rate",
    "geolocation_qual",
];

/// One pixel cloud measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub height: f64,
    pub water_frac: f64,
    pub coherent_power: f64,
    pub classification: u8,
    pub missed_detection_rate: f64,
    pub geolocation_qual: u32,
}

/// Columnar payload as received from a client or file, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPointCloud {
    pub latitude: Option<Vec<f64>>,
    pub longitude: Option<Vec<f64>>,
    pub height: Option<Vec<f64>>,
    pub water_frac: Option<Vec<f64>>,
    pub coherent_power: Option<Vec<f64>>,
    pub classification: Option<Vec<u8>>,
    pub missed_detection_rate: Option<Vec<f64>>,
    pub geolocation_qual: Option<Vec<u32>>,
}

/// A validated pixel cloud: every field present, every column the same length.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PointCloud {
    latitude: Vec<f64>,
    longitude: Vec<f64>,
    height: Vec<f64>,
    water_frac: Vec<f64>,
    coherent_power: Vec<f64>,
    classification: Vec<u8>,
    missed_detection_rate: Vec<f64>,
    geolocation_qual: Vec<u32>,
}

fn require<T>(column: Option<Vec<T>>, field: &str) -> PipelineResult<Vec<T>> {
    column.ok_or_else(|| PipelineError::missing_field(field))
}

fn check_len(field: &str, len: usize, expected: usize) -> PipelineResult<()> {
    if len != expected {
        return Err(PipelineError::InputSchema {
            field: field.to_string(),
            message: format!("length {} does not match latitude length {}", len, expected),
        });
    }
    Ok(())
}

impl TryFrom<RawPointCloud> for PointCloud {
    type Error = PipelineError;

    fn try_from(raw: RawPointCloud) -> PipelineResult<Self> {
        let cloud = PointCloud {
            latitude: require(raw.latitude, "latitude")?,
            longitude: require(raw.longitude, "longitude")?,
            height: require(raw.height, "height")?,
            water_frac: require(raw.water_frac, "water_frac")?,
            coherent_power: require(raw.coherent_power, "coherent_power")?,
            classification: require(raw.classification, "classification")?,
            missed_detection_rate: require(raw.missed_detection_rate, "missed_detection_rate")?,
            geolocation_qual: require(raw.geolocation_qual, "geolocation_qual")?,
        };

        let expected = cloud.latitude.len();
        check_len("longitude", cloud.longitude.len(), expected)?;
        check_len("height", cloud.height.len(), expected)?;
        check_len("water_frac", cloud.water_frac.len(), expected)?;
        check_len("coherent_power", cloud.coherent_power.len(), expected)?;
        check_len("classification", cloud.classification.len(), expected)?;
        check_len(
            "missed_detection_rate",
            cloud.missed_detection_rate.len(),
            expected,
        )?;
        check_len("geolocation_qual", cloud.geolocation_qual.len(), expected)?;

        Ok(cloud)
    }
}

impl FromIterator<PointRecord> for PointCloud {
    fn from_iter<I: IntoIterator<Item = PointRecord>>(iter: I) -> Self {
        let mut cloud = PointCloud::default();
        for r in iter {
            cloud.latitude.push(r.latitude);
            cloud.longitude.push(r.longitude);
            cloud.height.push(r.height);
            cloud.water_frac.push(r.water_frac);
            cloud.coherent_power.push(r.coherent_power);
            cloud.classification.push(r.classification);
            cloud.missed_detection_rate.push(r.missed_detection_rate);
            cloud.geolocation_qual.push(r.geolocation_qual);
        }
        cloud
    }
}

impl PointCloud {
    /// Parse a columnar JSON object and validate it.
    pub fn from_json_str(s: &str) -> PipelineResult<Self> {
        let raw: RawPointCloud = serde_json::from_str(s).map_err(|e| PipelineError::InputSchema {
            field: "point_cloud".to_string(),
            message: e.to_string(),
        })?;
        PointCloud::try_from(raw)
    }

    pub fn len(&self) -> usize {
        self.latitude.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latitude.is_empty()
    }

    /// The record at array position `index`.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    pub fn record(&self, index: usize) -> PointRecord {
        PointRecord {
            latitude: self.latitude[index],
            longitude: self.longitude[index],
            height: self.height[index],
            water_frac: self.water_frac[index],
            coherent_power: self.coherent_power[index],
            classification: self.classification[index],
            missed_detection_rate: self.missed_detection_rate[index],
            geolocation_qual: self.geolocation_qual[index],
        }
    }

    /// Geographic `(lon, lat)` of every record, in source order.
    pub fn positions(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.longitude
            .iter()
            .copied()
            .zip(self.latitude.iter().copied())
    }

    /// Geographic extent of the finite positions. `None` when there are none.
    pub fn extent(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.positions())
    }
}
