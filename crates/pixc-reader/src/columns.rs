//! Raw pixel cloud columns and their conversion into a `PointCloud`.
//!
//! NetCDF variables are read as `f64` together with their CF packing and fill
//! attributes. Unpacking and fill masking happen here so they can be tested
//! without the NetCDF library.

use river_core::{PointCloud, PointRecord};
use swath_common::PipelineError;
use tracing::debug;

use crate::error::PixcResult;

/// One variable of the `pixel_cloud` group.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub values: Vec<f64>,
    /// `_FillValue`, compared against the packed values.
    pub fill: Option<f64>,
    pub scale_factor: f64,
    pub add_offset: f64,
}

impl Column {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            fill: None,
            scale_factor: 1.0,
            add_offset: 0.0,
        }
    }

    pub fn with_fill(mut self, fill: f64) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn with_packing(mut self, scale_factor: f64, add_offset: f64) -> Self {
        self.scale_factor = scale_factor;
        self.add_offset = add_offset;
        self
    }

    fn is_fill(&self, i: usize) -> bool {
        let v = self.values[i];
        v.is_nan() || self.fill == Some(v)
    }

    /// Unpacked value, NaN where the packed value is the fill value.
    fn value(&self, i: usize) -> f64 {
        if self.is_fill(i) {
            f64::NAN
        } else {
            self.values[i] * self.scale_factor + self.add_offset
        }
    }

    /// Unpacked value for integer flag variables; fill passes through as-is.
    fn raw(&self, i: usize) -> f64 {
        if self.fill == Some(self.values[i]) {
            self.values[i]
        } else {
            self.values[i] * self.scale_factor + self.add_offset
        }
    }
}

/// The eight variables making up a pixel cloud.
#[derive(Debug, Clone, PartialEq)]
pub struct PixcColumns {
    pub latitude: Column,
    pub longitude: Column,
    pub height: Column,
    pub water_frac: Column,
    pub coherent_power: Column,
    pub classification: Column,
    pub missed_detection_rate: Column,
    pub geolocation_qual: Column,
}

impl PixcColumns {
    fn named(&self) -> [(&'static str, &Column); 8] {
        [
            ("latitude", &self.latitude),
            ("longitude", &self.longitude),
            ("height", &self.height),
            ("water_frac", &self.water_frac),
            ("coherent_power", &self.coherent_power),
            ("classification", &self.classification),
            ("missed_detection_rate", &self.missed_detection_rate),
            ("geolocation_qual", &self.geolocation_qual),
        ]
    }

    /// Unpack, mask fill values and drop records without a position.
    pub fn into_point_cloud(self) -> PixcResult<PointCloud> {
        let n = self.latitude.values.len();
        for (field, column) in self.named() {
            if column.values.len() != n {
                return Err(PipelineError::InputSchema {
                    field: field.to_string(),
                    message: format!(
                        "length {} does not match latitude length {}",
                        column.values.len(),
                        n
                    ),
                }
                .into());
            }
        }

        let mut dropped = 0usize;
        let cloud: PointCloud = (0..n)
            .filter(|&i| {
                let keep = !self.latitude.is_fill(i) && !self.longitude.is_fill(i);
                if !keep {
                    dropped += 1;
                }
                keep
            })
            .map(|i| PointRecord {
                latitude: self.latitude.value(i),
                longitude: self.longitude.value(i),
                height: self.height.value(i),
                water_frac: self.water_frac.value(i),
                coherent_power: self.coherent_power.value(i),
                classification: self.classification.raw(i) as u8,
                missed_detection_rate: self.missed_detection_rate.value(i),
                geolocation_qual: self.geolocation_qual.raw(i) as u32,
            })
            .collect();

        if dropped > 0 {
            debug!(dropped, kept = cloud.len(), "Dropped pixels with fill positions");
        }
        Ok(cloud)
    }
}
