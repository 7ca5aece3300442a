//! Corridor construction around the centerline.
//!
//! The corridor is the planar buffer of the original (undensified) line with
//! flat end caps and round joins. It is assembled from simple pieces rather
//! than a polygon union:
//! - one rectangle per segment, `buffer_distance` either side of it
//! - one circular sector per interior vertex where the line turns, on the
//!   outer side of the turn only
//!
//! A point is in the corridor when it is in any piece. The pieces are built
//! in planar coordinates and then mapped back to geographic coordinates,
//! since the containment test runs against geographic point positions.

use geo::{Coord, LineString, Polygon};
use projection::PlanarTransform;
use swath_common::{PipelineError, PipelineResult};

/// Segments per quarter circle when approximating a round join.
pub const QUADRANT_SEGMENTS: usize = 16;

/// Turns flatter than this (|sin| of the turn angle) need no join.
const COLLINEAR_TOLERANCE: f64 = 1e-12;

/// The buffered centerline, as polygons in geographic `(lon, lat)` coordinates.
#[derive(Debug, Clone, Default)]
pub struct Corridor {
    polygons: Vec<Polygon<f64>>,
}

impl Corridor {
    /// Buffer every planar line part by `buffer_distance` and map the result
    /// to geographic coordinates with `transform`.
    ///
    /// A zero buffer yields an empty corridor that contains nothing.
    pub fn build<T: PlanarTransform + ?Sized>(
        parts: &[Vec<(f64, f64)>],
        buffer_distance: f64,
        transform: &T,
    ) -> PipelineResult<Self> {
        if !buffer_distance.is_finite() || buffer_distance < 0.0 {
            return Err(PipelineError::parameter(
                "buffer_distance",
                buffer_distance,
                "must be a finite value >= 0",
            ));
        }
        if buffer_distance == 0.0 {
            return Ok(Self::default());
        }

        let polygons = parts
            .iter()
            .flat_map(|part| buffer_rings(part, buffer_distance))
            .map(|ring| {
                let coords: Vec<Coord<f64>> = ring
                    .into_iter()
                    .map(|(x, y)| {
                        let (lon, lat) = transform.inverse(x, y);
                        Coord { x: lon, y: lat }
                    })
                    .collect();
                Polygon::new(LineString::from(coords), vec![])
            })
            .collect();

        Ok(Self { polygons })
    }

    pub fn polygons(&self) -> &[Polygon<f64>] {
        &self.polygons
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }
}

/// Planar rings whose union is the flat-capped buffer of one line part.
///
/// Consecutive duplicate vertices are ignored. Rings are closed.
pub fn buffer_rings(vertices: &[(f64, f64)], distance: f64) -> Vec<Vec<(f64, f64)>> {
    let mut points: Vec<(f64, f64)> = Vec::with_capacity(vertices.len());
    for &v in vertices {
        if points.last() != Some(&v) {
            points.push(v);
        }
    }

    let mut rings = Vec::new();
    for w in points.windows(2) {
        rings.push(segment_rectangle(w[0], w[1], distance));
    }

    for w in points.windows(3) {
        if let Some(wedge) = join_wedge(w[0], w[1], w[2], distance) {
            rings.push(wedge);
        }
    }

    rings
}

fn segment_rectangle(a: (f64, f64), b: (f64, f64), distance: f64) -> Vec<(f64, f64)> {
    let len = (b.0 - a.0).hypot(b.1 - a.1);
    // Left-hand normal scaled to the buffer distance
    let nx = -(b.1 - a.1) / len * distance;
    let ny = (b.0 - a.0) / len * distance;
    vec![
        (a.0 + nx, a.1 + ny),
        (b.0 + nx, b.1 + ny),
        (b.0 - nx, b.1 - ny),
        (a.0 - nx, a.1 - ny),
        (a.0 + nx, a.1 + ny),
    ]
}

/// Signed turn angle at `b`, positive for a left turn; `None` when straight.
fn turn_angle(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Option<f64> {
    let (ux, uy) = (b.0 - a.0, b.1 - a.1);
    let (vx, vy) = (c.0 - b.0, c.1 - b.1);
    let norm = ux.hypot(uy) * vx.hypot(vy);
    let sin = (ux * vy - uy * vx) / norm;
    let cos = (ux * vx + uy * vy) / norm;
    if sin.abs() <= COLLINEAR_TOLERANCE && cos >= 0.0 {
        return None;
    }
    Some(sin.atan2(cos))
}

/// Round join at `b`: the sector of radius `distance` between the two
/// segment normals on the outer side of the turn.
///
/// The inner side of the turn is already covered by the segment rectangles.
/// A full disk would also reach past a short neighbouring segment's flat cap.
fn join_wedge(
    a: (f64, f64),
    b: (f64, f64),
    c: (f64, f64),
    distance: f64,
) -> Option<Vec<(f64, f64)>> {
    let turn = turn_angle(a, b, c)?;
    // Left-hand normal angle of the incoming segment
    let left = (b.1 - a.1).atan2(b.0 - a.0) + std::f64::consts::FRAC_PI_2;
    // Left turns bulge to the right, right turns to the left. The normals
    // rotate with the direction, so the arc sweeps by the turn angle.
    let start = if turn > 0.0 {
        left + std::f64::consts::PI
    } else {
        left
    };

    let steps = ((turn.abs() / std::f64::consts::FRAC_PI_2) * QUADRANT_SEGMENTS as f64)
        .ceil()
        .max(1.0) as usize;
    let mut ring = Vec::with_capacity(steps + 3);
    ring.push(b);
    for k in 0..=steps {
        let angle = start + turn * k as f64 / steps as f64;
        ring.push((b.0 + distance * angle.cos(), b.1 + distance * angle.sin()));
    }
    ring.push(b);
    Some(ring)
}
