//! Universal Transverse Mercator projection.
//!
//! Maps WGS84 geographic coordinates onto a 6° wide UTM zone in meters.
//! Within the zone the scale error stays below 1 part in 2500, which is what
//! makes it a suitable planar CRS for buffering and distance arithmetic on a
//! river reach.
//!
//! The series are the USGS formulation (Snyder, "Map Projections - A Working
//! Manual", pp. 60-64):
//! - Scale factor on the central meridian (k0): 0.9996
//! - False easting: 500 000 m
//! - False northing: 0 m (north), 10 000 000 m (south)

use swath_common::crs::{CrsCode, Hemisphere};

use crate::transform::PlanarTransform;
use crate::ProjectionError;

/// WGS84 semi-major axis (meters)
const WGS84_A: f64 = 6378137.0;
/// WGS84 flattening
const WGS84_F: f64 = 1.0 / 298.257223563;
/// UTM scale factor on the central meridian
const K0: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Transverse Mercator parameters for one UTM zone.
#[derive(Debug, Clone)]
pub struct TransverseMercator {
    /// The CRS this projection implements
    pub crs: CrsCode,
    /// Central meridian in radians
    pub lon0: f64,
    /// False northing (meters)
    pub false_northing: f64,
    /// First eccentricity squared
    e2: f64,
    /// Second eccentricity squared
    ep2: f64,
    /// Meridian arc series coefficients
    m1: f64,
    m2: f64,
    m3: f64,
    m4: f64,
    /// Footpoint latitude series coefficient
    e1: f64,
}

impl TransverseMercator {
    /// Create the projection for a UTM zone.
    pub fn utm(zone: u8, hemisphere: Hemisphere) -> Result<Self, ProjectionError> {
        if !(1..=60).contains(&zone) {
            return Err(ProjectionError::InvalidZone(zone));
        }

        let crs = CrsCode::Utm { zone, hemisphere };
        // central_meridian is always Some for a UTM code
        let lon0 = crs.central_meridian().unwrap_or_default().to_radians();
        let false_northing = match hemisphere {
            Hemisphere::North => 0.0,
            Hemisphere::South => FALSE_NORTHING_SOUTH,
        };

        let e2 = WGS84_F * (2.0 - WGS84_F);
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let ep2 = e2 / (1.0 - e2);
        let sqrt_1_e2 = (1.0 - e2).sqrt();

        Ok(Self {
            crs,
            lon0,
            false_northing,
            e2,
            ep2,
            m1: 1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0,
            m2: 3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0,
            m3: 15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0,
            m4: 35.0 * e6 / 3072.0,
            e1: (1.0 - sqrt_1_e2) / (1.0 + sqrt_1_e2),
        })
    }

    /// Create the projection for a resolved CRS code.
    pub fn from_crs(crs: CrsCode) -> Result<Self, ProjectionError> {
        match crs {
            CrsCode::Utm { zone, hemisphere } => Self::utm(zone, hemisphere),
            other => Err(ProjectionError::NotPlanar(other.to_string())),
        }
    }

    /// Meridian arc length from the equator to latitude `phi` (radians).
    fn meridian_arc(&self, phi: f64) -> f64 {
        WGS84_A
            * (self.m1 * phi - self.m2 * (2.0 * phi).sin() + self.m3 * (4.0 * phi).sin()
                - self.m4 * (6.0 * phi).sin())
    }

    /// Convert geographic coordinates (degrees) to easting/northing (meters).
    pub fn geo_to_utm(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let phi = lat_deg.to_radians();
        let lam = lon_deg.to_radians();

        let sin_phi = phi.sin();
        let cos_phi = phi.cos();
        let tan_phi = phi.tan();

        let n = WGS84_A / (1.0 - self.e2 * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let c = self.ep2 * cos_phi * cos_phi;
        let a = (lam - self.lon0) * cos_phi;
        let m = self.meridian_arc(phi);

        let a2 = a * a;
        let a3 = a2 * a;
        let a4 = a3 * a;
        let a5 = a4 * a;
        let a6 = a5 * a;

        let x = K0
            * n
            * (a + (1.0 - t + c) * a3 / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * self.ep2) * a5 / 120.0)
            + FALSE_EASTING;

        let y = K0
            * (m + n
                * tan_phi
                * (a2 / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * self.ep2) * a6 / 720.0))
            + self.false_northing;

        (x, y)
    }

    /// Convert easting/northing (meters) to geographic coordinates (degrees).
    ///
    /// Returns `(lon, lat)`.
    pub fn utm_to_geo(&self, x: f64, y: f64) -> (f64, f64) {
        let m = (y - self.false_northing) / K0;
        let mu = m / (WGS84_A * self.m1);
        let e1 = self.e1;

        // Footpoint latitude
        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let sin_phi1 = phi1.sin();
        let cos_phi1 = phi1.cos();
        let tan_phi1 = phi1.tan();

        let c1 = self.ep2 * cos_phi1 * cos_phi1;
        let t1 = tan_phi1 * tan_phi1;
        let denom = 1.0 - self.e2 * sin_phi1 * sin_phi1;
        let n1 = WGS84_A / denom.sqrt();
        let r1 = WGS84_A * (1.0 - self.e2) / denom.powf(1.5);
        let d = (x - FALSE_EASTING) / (n1 * K0);

        let d2 = d * d;
        let d3 = d2 * d;
        let d4 = d3 * d;
        let d5 = d4 * d;
        let d6 = d5 * d;

        let phi = phi1
            - (n1 * tan_phi1 / r1)
                * (d2 / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * self.ep2) * d4 / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1
                        - 252.0 * self.ep2
                        - 3.0 * c1 * c1)
                        * d6
                        / 720.0);

        let lam = self.lon0
            + (d - (1.0 + 2.0 * t1 + c1) * d3 / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * self.ep2 + 24.0 * t1 * t1)
                    * d5
                    / 120.0)
                / cos_phi1;

        (lam.to_degrees(), phi.to_degrees())
    }
}

impl PlanarTransform for TransverseMercator {
    fn crs(&self) -> CrsCode {
        self.crs
    }

    fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        self.geo_to_utm(lon, lat)
    }

    fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        self.utm_to_geo(x, y)
    }
}
