//! River centerline input.
//!
//! Centerlines arrive as GeoJSON: a `FeatureCollection`, a single `Feature`
//! (what a map drawing tool emits), or a bare geometry. Only `LineString` and
//! `MultiLineString` geometries describe a centerline; anything else is
//! rejected rather than silently skipped.

use serde::Deserialize;
use swath_common::{BoundingBox, PipelineError, PipelineResult};

/// A GeoJSON position: `[longitude, latitude]` with an optional altitude.
pub type Position = Vec<f64>;

/// Top-level GeoJSON object accepted as a centerline.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum CenterlineGeoJson {
    FeatureCollection {
        features: Vec<CenterlineFeature>,
    },
    Feature {
        geometry: Option<CenterlineGeometry>,
    },
    LineString {
        coordinates: Vec<Position>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Position>>,
    },
}

/// A GeoJSON Feature; properties are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CenterlineFeature {
    pub geometry: Option<CenterlineGeometry>,
}

/// GeoJSON geometry types as they appear inside a Feature.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum CenterlineGeometry {
    LineString {
        coordinates: Vec<Position>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Position>>,
    },
    /// Point, Polygon and the rest: not a centerline.
    #[serde(other)]
    Unsupported,
}

/// An ordered set of line parts in geographic `(lon, lat)` coordinates.
///
/// Each part has at least two finite vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct LineGeometry {
    parts: Vec<Vec<(f64, f64)>>,
}

fn to_vertex(position: &[f64]) -> PipelineResult<(f64, f64)> {
    match position {
        [lon, lat, ..] if lon.is_finite() && lat.is_finite() => Ok((*lon, *lat)),
        [_, _, ..] => Err(PipelineError::Geometry(format!(
            "non-finite vertex {:?}",
            position
        ))),
        _ => Err(PipelineError::Geometry(format!(
            "position needs longitude and latitude, got {:?}",
            position
        ))),
    }
}

fn to_part(positions: &[Position]) -> PipelineResult<Vec<(f64, f64)>> {
    positions.iter().map(|p| to_vertex(p)).collect()
}

fn collect_geometry(
    geometry: &CenterlineGeometry,
    parts: &mut Vec<Vec<(f64, f64)>>,
) -> PipelineResult<()> {
    match geometry {
        CenterlineGeometry::LineString { coordinates } => parts.push(to_part(coordinates)?),
        CenterlineGeometry::MultiLineString { coordinates } => {
            for line in coordinates {
                parts.push(to_part(line)?);
            }
        }
        CenterlineGeometry::Unsupported => {
            return Err(PipelineError::Geometry(
                "centerline features must be LineString or MultiLineString".to_string(),
            ))
        }
    }
    Ok(())
}

impl LineGeometry {
    /// Build from explicit parts, validating vertex counts and finiteness.
    pub fn new(parts: Vec<Vec<(f64, f64)>>) -> PipelineResult<Self> {
        if parts.is_empty() {
            return Err(PipelineError::Geometry(
                "centerline has no lines".to_string(),
            ));
        }
        for (i, part) in parts.iter().enumerate() {
            if part.len() < 2 {
                return Err(PipelineError::Geometry(format!(
                    "line {} has {} vertices, at least 2 required",
                    i,
                    part.len()
                )));
            }
            if part.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
                return Err(PipelineError::Geometry(format!(
                    "line {} has a non-finite vertex",
                    i
                )));
            }
        }
        Ok(Self { parts })
    }

    /// Convert parsed GeoJSON into line parts, one per LineString.
    pub fn from_geojson(geojson: &CenterlineGeoJson) -> PipelineResult<Self> {
        let mut parts = Vec::new();
        match geojson {
            CenterlineGeoJson::FeatureCollection { features } => {
                for feature in features {
                    if let Some(geometry) = &feature.geometry {
                        collect_geometry(geometry, &mut parts)?;
                    }
                }
            }
            CenterlineGeoJson::Feature { geometry } => {
                if let Some(geometry) = geometry {
                    collect_geometry(geometry, &mut parts)?;
                }
            }
            CenterlineGeoJson::LineString { coordinates } => parts.push(to_part(coordinates)?),
            CenterlineGeoJson::MultiLineString { coordinates } => {
                for line in coordinates {
                    parts.push(to_part(line)?);
                }
            }
        }
        Self::new(parts)
    }

    /// Parse a GeoJSON document.
    pub fn from_geojson_str(s: &str) -> PipelineResult<Self> {
        let geojson: CenterlineGeoJson = serde_json::from_str(s)
            .map_err(|e| PipelineError::Geometry(format!("invalid centerline GeoJSON: {}", e)))?;
        Self::from_geojson(&geojson)
    }

    /// Same as [`LineGeometry::from_geojson_str`] for an already-parsed JSON value.
    pub fn from_geojson_value(value: serde_json::Value) -> PipelineResult<Self> {
        let geojson: CenterlineGeoJson = serde_json::from_value(value)
            .map_err(|e| PipelineError::Geometry(format!("invalid centerline GeoJSON: {}", e)))?;
        Self::from_geojson(&geojson)
    }

    pub fn parts(&self) -> &[Vec<(f64, f64)>] {
        &self.parts
    }

    /// Geographic extent of all vertices.
    pub fn extent(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.parts.iter().flatten().copied())
    }
}
