//! Common fixtures for river-core integration tests
//!
//! Provides:
//! - An identity planar transform, so tests can state geometry in plain units
//! - Point cloud builders
//! - A brute-force nearest-station scan to check the index against

#![allow(dead_code)]

use projection::PlanarTransform;
use river_core::{PointCloud, PointRecord, Station};
use swath_common::CrsCode;

/// Treats geographic coordinates as already planar.
pub struct Identity;

impl PlanarTransform for Identity {
    fn crs(&self) -> CrsCode {
        CrsCode::Epsg4326
    }

    fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        (lon, lat)
    }

    fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        (x, y)
    }
}

/// A record at `(lon, lat)` whose height tags it for identification.
pub fn point(lon: f64, lat: f64, height: f64) -> PointRecord {
    PointRecord {
        latitude: lat,
        longitude: lon,
        height,
        water_frac: 0.9,
        coherent_power: 150.0,
        classification: 4,
        missed_detection_rate: 0.0,
        geolocation_qual: 0,
    }
}

/// Cloud of records at the given positions, tagged 0, 1, 2, ... by height.
pub fn cloud_at(positions: &[(f64, f64)]) -> PointCloud {
    positions
        .iter()
        .enumerate()
        .map(|(i, &(lon, lat))| point(lon, lat, i as f64))
        .collect()
}

/// Regular grid of points covering `[x0, x1] x [y0, y1]`.
pub fn grid_cloud(x0: f64, x1: f64, y0: f64, y1: f64, step: f64) -> PointCloud {
    let mut positions = Vec::new();
    let mut y = y0;
    while y <= y1 {
        let mut x = x0;
        while x <= x1 {
            positions.push((x, y));
            x += step;
        }
        y += step;
    }
    cloud_at(&positions)
}

/// Exhaustive nearest scan: `(min distance, every station index at that distance)`.
pub fn brute_force_nearest(stations: &[Station], x: f64, y: f64) -> (f64, Vec<usize>) {
    let d2 = |s: &Station| {
        let dx = s.x - x;
        let dy = s.y - y;
        dx * dx + dy * dy
    };
    let best = stations.iter().map(d2).fold(f64::INFINITY, f64::min);
    let ties = stations
        .iter()
        .filter(|s| d2(*s) == best)
        .map(|s| s.index)
        .collect();
    (best.sqrt(), ties)
}

/// Distance from `(x, y)` to the segment `a`-`b`.
pub fn distance_to_segment(a: (f64, f64), b: (f64, f64), x: f64, y: f64) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len2 = dx * dx + dy * dy;
    let t = (((x - a.0) * dx + (y - a.1) * dy) / len2).clamp(0.0, 1.0);
    (a.0 + t * dx - x).hypot(a.1 + t * dy - y)
}

/// Whether `(x, y)` lies in the flat-capped, round-joined buffer of a
/// polyline: beside some segment (projection parameter within `[0, 1]`),
/// or in the outer join sector of an interior vertex.
pub fn in_flat_capped_buffer(vertices: &[(f64, f64)], buffer: f64, x: f64, y: f64) -> bool {
    const EPS: f64 = 1e-9;
    let beside_segment = vertices.windows(2).any(|w| {
        let (a, b) = (w[0], w[1]);
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let len2 = dx * dx + dy * dy;
        let t = ((x - a.0) * dx + (y - a.1) * dy) / len2;
        (-EPS..=1.0 + EPS).contains(&t) && distance_to_segment(a, b, x, y) <= buffer + EPS
    });
    let in_join = vertices.windows(3).any(|w| {
        let (a, b, c) = (w[0], w[1], w[2]);
        let (ux, uy) = (b.0 - a.0, b.1 - a.1);
        let (vx, vy) = (c.0 - b.0, c.1 - b.1);
        let (wx, wy) = (x - b.0, y - b.1);
        wx.hypot(wy) <= buffer + EPS && wx * ux + wy * uy >= -EPS && wx * vx + wy * vy <= EPS
    });
    beside_segment || in_join
}
