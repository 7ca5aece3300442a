//! Centerline densification into stations.
//!
//! Each line part is resampled at a fixed arc-length spacing. For a part of
//! length `L` there are `floor(L / spacing) + 1` stations at arc-lengths
//! `0, spacing, 2 * spacing, ...`. The last station does not snap to the end
//! of the part, so up to `spacing` of the line's tail may be unsampled.
//!
//! All inputs are planar coordinates.

use serde::Serialize;
use swath_common::{PipelineError, PipelineResult};

/// Relative tolerance when deciding whether `L / spacing` is an integer.
const RATIO_TOLERANCE: f64 = 1e-9;

/// Upper bound on the number of stations a single run may produce.
pub const MAX_STATIONS: usize = 20_000_000;

/// A densified sample of the centerline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Station {
    /// Position in the run's station sequence, across all parts.
    pub index: usize,
    /// Line part this station belongs to.
    pub part: usize,
    pub x: f64,
    pub y: f64,
    /// Planar distance to the previous station of the same part (0 for the first).
    pub distance_to_prev: f64,
    /// Running sum of `distance_to_prev` within the part.
    pub cumulative_distance: f64,
}

fn segment_length(a: (f64, f64), b: (f64, f64)) -> f64 {
    (b.0 - a.0).hypot(b.1 - a.1)
}

/// Length of a planar polyline.
pub fn part_length(vertices: &[(f64, f64)]) -> f64 {
    vertices
        .windows(2)
        .map(|w| segment_length(w[0], w[1]))
        .sum()
}

/// Number of spacing intervals that fit in `length`.
fn interval_count(length: f64, spacing: f64) -> f64 {
    let ratio = length / spacing;
    let ceil = ratio.ceil();
    // 10.0 / (10.0 / 3.0) style ratios land a hair below the integer
    if ceil - ratio <= RATIO_TOLERANCE * ratio.max(1.0) {
        ceil
    } else {
        ratio.floor()
    }
}

/// Walks a polyline, returning points at increasing arc-length positions.
struct ArcWalker<'a> {
    vertices: &'a [(f64, f64)],
    segment: usize,
    segment_start: f64,
}

impl<'a> ArcWalker<'a> {
    fn new(vertices: &'a [(f64, f64)]) -> Self {
        Self {
            vertices,
            segment: 0,
            segment_start: 0.0,
        }
    }

    /// Point at arc-length `s`. Calls must use non-decreasing `s`.
    fn point_at(&mut self, s: f64) -> (f64, f64) {
        let last = self.vertices.len() - 1;
        while self.segment < last {
            let a = self.vertices[self.segment];
            let b = self.vertices[self.segment + 1];
            let len = segment_length(a, b);
            let offset = s - self.segment_start;
            if offset <= len && len > 0.0 {
                let t = offset / len;
                return (a.0 + t * (b.0 - a.0), a.1 + t * (b.1 - a.1));
            }
            if self.segment + 1 == last {
                break;
            }
            self.segment += 1;
            self.segment_start += len;
        }
        self.vertices[last]
    }
}

/// Densify one planar line part.
///
/// `first_index` is the global index assigned to the part's first station.
pub fn densify_part(
    vertices: &[(f64, f64)],
    spacing: f64,
    part: usize,
    first_index: usize,
) -> PipelineResult<Vec<Station>> {
    if vertices.len() < 2 {
        return Err(PipelineError::Geometry(format!(
            "line {} has {} vertices, at least 2 required",
            part,
            vertices.len()
        )));
    }

    let length = part_length(vertices);
    if length.is_nan() || length <= 0.0 {
        return Err(PipelineError::Geometry(format!("line {} has zero length", part)));
    }

    let intervals = interval_count(length, spacing);
    if intervals + 1.0 > MAX_STATIONS as f64 {
        return Err(PipelineError::parameter(
            "spacing",
            spacing,
            format!(
                "would produce more than {} stations for a line of length {:.3}",
                MAX_STATIONS, length
            ),
        ));
    }
    let intervals = intervals as usize;

    let mut walker = ArcWalker::new(vertices);
    let mut stations: Vec<Station> = Vec::with_capacity(intervals + 1);
    let mut cumulative = 0.0;

    for i in 0..=intervals {
        let (x, y) = walker.point_at(i as f64 * spacing);
        let distance_to_prev = match stations.last() {
            Some(prev) => segment_length((prev.x, prev.y), (x, y)),
            None => 0.0,
        };
        cumulative += distance_to_prev;
        stations.push(Station {
            index: first_index + i,
            part,
            x,
            y,
            distance_to_prev,
            cumulative_distance: cumulative,
        });
    }

    Ok(stations)
}

/// Densify every part, numbering stations consecutively across parts.
pub fn densify(parts: &[Vec<(f64, f64)>], spacing: f64) -> PipelineResult<Vec<Station>> {
    let mut stations = Vec::new();
    for (part, vertices) in parts.iter().enumerate() {
        let part_stations = densify_part(vertices, spacing, part, stations.len())?;
        stations.extend(part_stations);
        if stations.len() > MAX_STATIONS {
            return Err(PipelineError::parameter(
                "spacing",
                spacing,
                format!("would produce more than {} stations", MAX_STATIONS),
            ));
        }
    }
    Ok(stations)
}
