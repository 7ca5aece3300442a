//! Coordinate Reference System types and the planar CRS resolver.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::BoundingBox;

/// Width of a UTM zone in degrees of longitude.
const UTM_ZONE_WIDTH_DEG: f64 = 6.0;

/// Number of UTM zones around the globe.
const UTM_ZONE_COUNT: u8 = 60;

/// Hemisphere variant of a UTM zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hemisphere {
    North,
    South,
}

/// Coordinate reference systems used by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CrsCode {
    /// WGS84 Geographic (lon/lat in degrees)
    Epsg4326,
    /// WGS84 / UTM zone (meters). EPSG 326zz (north) or 327zz (south).
    Utm { zone: u8, hemisphere: Hemisphere },
}

impl CrsCode {
    /// Resolve the UTM zone appropriate for a geographic extent.
    ///
    /// The zone is taken from the center longitude as
    /// `floor((lon + 180) / 6) + 1`, the hemisphere from the sign of the
    /// center latitude (`>= 0` is north).
    pub fn utm_for_extent(extent: &BoundingBox) -> Result<Self, CrsParseError> {
        let (lon, lat) = extent.center();
        Self::utm_for_point(lon, lat)
    }

    /// Resolve the UTM zone containing a single geographic point.
    pub fn utm_for_point(lon: f64, lat: f64) -> Result<Self, CrsParseError> {
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(CrsParseError::OutOfRange(format!("longitude {}", lon)));
        }
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(CrsParseError::OutOfRange(format!("latitude {}", lat)));
        }

        // lon == 180 lands on zone 61 by the formula; it belongs to zone 60.
        let zone = (((lon + 180.0) / UTM_ZONE_WIDTH_DEG).floor() as u8 + 1).min(UTM_ZONE_COUNT);
        let hemisphere = if lat >= 0.0 {
            Hemisphere::North
        } else {
            Hemisphere::South
        };

        Ok(CrsCode::Utm { zone, hemisphere })
    }

    /// Parse an "EPSG:xxxx" string.
    pub fn from_epsg_string(s: &str) -> Result<Self, CrsParseError> {
        let normalized = s.trim().to_uppercase();
        let code = normalized
            .strip_prefix("EPSG:")
            .and_then(|c| c.parse::<u32>().ok())
            .ok_or_else(|| CrsParseError::UnsupportedCrs(s.to_string()))?;

        match code {
            4326 => Ok(CrsCode::Epsg4326),
            32601..=32660 => Ok(CrsCode::Utm {
                zone: (code - 32600) as u8,
                hemisphere: Hemisphere::North,
            }),
            32701..=32760 => Ok(CrsCode::Utm {
                zone: (code - 32700) as u8,
                hemisphere: Hemisphere::South,
            }),
            _ => Err(CrsParseError::UnsupportedCrs(s.to_string())),
        }
    }

    /// Numeric EPSG code.
    pub fn epsg(&self) -> u32 {
        match self {
            CrsCode::Epsg4326 => 4326,
            CrsCode::Utm {
                zone,
                hemisphere: Hemisphere::North,
            } => 32600 + *zone as u32,
            CrsCode::Utm {
                zone,
                hemisphere: Hemisphere::South,
            } => 32700 + *zone as u32,
        }
    }

    /// Central meridian of a UTM zone in degrees. `None` for geographic CRS.
    pub fn central_meridian(&self) -> Option<f64> {
        match self {
            CrsCode::Utm { zone, .. } => Some(*zone as f64 * UTM_ZONE_WIDTH_DEG - 183.0),
            CrsCode::Epsg4326 => None,
        }
    }

    /// Check if this is a geographic (lat/lon) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self, CrsCode::Epsg4326)
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CrsParseError {
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),

    #[error("Coordinate out of range for UTM zone resolution: {0}")]
    OutOfRange(String),
}
