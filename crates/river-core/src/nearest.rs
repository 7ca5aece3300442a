//! Nearest-station lookup over densified stations.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::densify::Station;

/// Station position stored in the index.
#[derive(Debug, Clone, Copy)]
struct StationPoint {
    index: usize,
    position: [f64; 2],
}

impl RTreeObject for StationPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for StationPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Result of a nearest-station query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    pub station_index: usize,
    /// Planar Euclidean distance to the station.
    pub distance: f64,
}

/// Static R-tree over station positions, bulk-loaded once per run.
pub struct StationIndex {
    tree: RTree<StationPoint>,
}

impl StationIndex {
    pub fn build(stations: &[Station]) -> Self {
        let points: Vec<StationPoint> = stations
            .iter()
            .map(|s| StationPoint {
                index: s.index,
                position: [s.x, s.y],
            })
            .collect();
        Self {
            tree: RTree::bulk_load(points),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Nearest station to planar `(x, y)`; equidistant stations resolve to the
    /// lowest index. `None` when the index is empty or the query is not finite.
    pub fn nearest(&self, x: f64, y: f64) -> Option<Nearest> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let query = [x, y];
        let first = self.tree.nearest_neighbor(&query)?;
        let best_d2 = first.distance_2(&query);

        let winner = self
            .tree
            .locate_within_distance(query, best_d2)
            .min_by_key(|p| p.index)
            .unwrap_or(first);

        Some(Nearest {
            station_index: winner.index,
            distance: winner.distance_2(&query).sqrt(),
        })
    }
}
