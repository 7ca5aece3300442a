//! Spatial clipping of the point cloud against the corridor.

use geo::{BoundingRect, Intersects, Point, Polygon};
use rstar::{RTree, RTreeObject, AABB};

use crate::corridor::Corridor;
use crate::input::PointCloud;

/// R-tree entry for a corridor polygon's bounding box
struct PolygonBboxEntry {
    idx: usize,
    min: [f64; 2],
    max: [f64; 2],
}

impl RTreeObject for PolygonBboxEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

/// Envelope index over corridor polygons for point-in-corridor queries.
pub struct CorridorIndex<'a> {
    polygons: &'a [Polygon<f64>],
    tree: RTree<PolygonBboxEntry>,
}

impl<'a> CorridorIndex<'a> {
    pub fn new(corridor: &'a Corridor) -> Self {
        let polygons = corridor.polygons();
        let entries: Vec<PolygonBboxEntry> = polygons
            .iter()
            .enumerate()
            .filter_map(|(idx, poly)| {
                poly.bounding_rect().map(|rect| PolygonBboxEntry {
                    idx,
                    min: [rect.min().x, rect.min().y],
                    max: [rect.max().x, rect.max().y],
                })
            })
            .collect();

        Self {
            polygons,
            tree: RTree::bulk_load(entries),
        }
    }

    /// Whether `(lon, lat)` lies in the corridor. Boundary points count as inside.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        if !lon.is_finite() || !lat.is_finite() {
            return false;
        }
        let point = Point::new(lon, lat);
        let envelope = AABB::from_point([lon, lat]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .any(|entry| self.polygons[entry.idx].intersects(&point))
    }
}

/// Source indices of the records inside the corridor, in source order.
pub fn clip(cloud: &PointCloud, corridor: &Corridor) -> Vec<usize> {
    if corridor.is_empty() {
        return Vec::new();
    }
    let index = CorridorIndex::new(corridor);
    cloud
        .positions()
        .enumerate()
        .filter(|(_, (lon, lat))| index.contains(*lon, *lat))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointRecord;
    use projection::PlanarTransform;
    use swath_common::CrsCode;

    struct Identity;

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

    fn cloud(points: &[(f64, f64)]) -> PointCloud {
        points
            .iter()
            .map(|&(lon, lat)| PointRecord {
                latitude: lat,
                longitude: lon,
                height: 0.0,
                water_frac: 1.0,
                coherent_power: 0.0,
                classification: 4,
                missed_detection_rate: 0.0,
                geolocation_qual: 0,
            })
            .collect()
    }

    #[test]
    fn test_clip_keeps_source_order() {
        let corridor =
            Corridor::build(&[vec![(0.0, 0.0), (0.0, 10.0)]], 2.0, &Identity).unwrap();
        let pc = cloud(&[(1.0, 3.0), (5.0, 3.0), (-1.5, 8.0), (0.0, 12.0), (0.0, 0.5)]);
        assert_eq!(clip(&pc, &corridor), vec![0, 2, 4]);
    }

    #[test]
    fn test_boundary_is_inside() {
        let corridor =
            Corridor::build(&[vec![(0.0, 0.0), (0.0, 10.0)]], 2.0, &Identity).unwrap();
        let pc = cloud(&[(2.0, 5.0), (-2.0, 0.0), (0.0, 10.0)]);
        assert_eq!(clip(&pc, &corridor), vec![0, 1, 2]);
    }

    #[test]
    fn test_overlapping_pieces_do_not_duplicate() {
        // The vertex at (10, 0) is covered by two rectangles and the join sector.
        let corridor = Corridor::build(
            &[vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]],
            1.0,
            &Identity,
        )
        .unwrap();
        let pc = cloud(&[(10.0, 0.0)]);
        assert_eq!(clip(&pc, &corridor), vec![0]);
    }

    #[test]
    fn test_non_finite_points_excluded() {
        let corridor =
            Corridor::build(&[vec![(0.0, 0.0), (0.0, 10.0)]], 2.0, &Identity).unwrap();
        let pc = cloud(&[(f64::NAN, 3.0), (0.0, f64::INFINITY), (0.0, 3.0)]);
        assert_eq!(clip(&pc, &corridor), vec![2]);
    }

    #[test]
    fn test_empty_corridor_selects_nothing() {
        let pc = cloud(&[(0.0, 0.0)]);
        assert!(clip(&pc, &Corridor::default()).is_empty());
    }
}
