//! Coordinate types.
//!
//! Two coordinate spaces coexist:
//!
//! - [`Point2`]: projected planar metres.  Every network node has one;
//!   edge lengths, the observation radius, and agent interpolation all
//!   work in this space.
//! - [`GeoPoint`]: WGS-84 latitude/longitude.  Used by the transit feed
//!   and by geocoding (snapping feed coordinates to network nodes).

/// A WGS-84 geographic coordinate.
///
/// Stored as `f64` because decoded transit polylines carry five decimal
/// digits and radius filtering compares distances of a few metres.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        const R: f64 = 6_371_000.0; // mean Earth radius, metres

        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let h = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        2.0 * R * h.sqrt().asin()
    }

    /// `true` if `self` lies within `radius_m` metres of `center`.
    #[inline]
    pub fn within_radius(self, center: GeoPoint, radius_m: f64) -> bool {
        self.distance_m(center) <= radius_m
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// A projected planar coordinate in metres.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in metres.
    #[inline]
    pub fn distance(self, other: Point2) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Linear interpolation towards `other`; `t` is clamped to `[0, 1]`.
    #[inline]
    pub fn lerp(self, other: Point2, t: f64) -> Point2 {
        let t = t.clamp(0.0, 1.0);
        Point2 {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Slope proxy between two projected points: `|dy| / horizontal distance`.
    ///
    /// Used when a topology source supplies geometry but no elevation data.
    pub fn slope_to(self, other: Point2) -> f64 {
        let horiz = self.distance(other).max(1e-6);
        (other.y - self.y).abs() / horiz
    }
}
