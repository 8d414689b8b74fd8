//! Sky directions and angular separations
//!
//! A [`SkyCoord`] is a direction on the celestial sphere in any spherical frame
//! (equatorial, galactic, ...). Frame transformations are not handled here; both
//! operands of [`SkyCoord::separation`] are assumed to share a frame.

use serde::{Deserialize, Serialize};

use crate::units::{Angle, AngleExt};

/// Direction on the sky
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyCoord {
    /// Longitude in radians
    pub lon: f64,
    /// Latitude in radians, in [-π/2, π/2]
    pub lat: f64,
}

impl SkyCoord {
    /// Create a direction from longitude/latitude in radians
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Create a direction from longitude/latitude in degrees
    pub fn from_degrees(lon_deg: f64, lat_deg: f64) -> Self {
        Self {
            lon: lon_deg.to_radians(),
            lat: lat_deg.to_radians(),
        }
    }

    /// Longitude in degrees
    pub fn lon_degrees(&self) -> f64 {
        self.lon.to_degrees()
    }

    /// Latitude in degrees
    pub fn lat_degrees(&self) -> f64 {
        self.lat.to_degrees()
    }

    /// Great-circle distance to another direction.
    ///
    /// Uses the Vincenty formula, which stays accurate both for tiny separations
    /// and for nearly antipodal points.
    pub fn separation(&self, other: &SkyCoord) -> Angle {
        let dlon = other.lon - self.lon;
        let (sin_dlon, cos_dlon) = dlon.sin_cos();
        let (sin_lat1, cos_lat1) = self.lat.sin_cos();
        let (sin_lat2, cos_lat2) = other.lat.sin_cos();

        let num1 = cos_lat2 * sin_dlon;
        let num2 = cos_lat1 * sin_lat2 - sin_lat1 * cos_lat2 * cos_dlon;
        let denominator = sin_lat1 * sin_lat2 + cos_lat1 * cos_lat2 * cos_dlon;

        Angle::from_radians(num1.hypot(num2).atan2(denominator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_separation_zero_for_same_point() {
        let a = SkyCoord::from_degrees(83.63, 22.01);
        assert_relative_eq!(a.separation(&a).as_degrees(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_separation_along_equator() {
        let a = SkyCoord::from_degrees(10.0, 0.0);
        let b = SkyCoord::from_degrees(13.5, 0.0);
        assert_relative_eq!(a.separation(&b).as_degrees(), 3.5, epsilon = 1e-10);
    }

    #[test]
    fn test_separation_along_meridian() {
        let a = SkyCoord::from_degrees(200.0, -20.0);
        let b = SkyCoord::from_degrees(200.0, 25.0);
        assert_relative_eq!(a.separation(&b).as_degrees(), 45.0, epsilon = 1e-10);
    }

    #[test]
    fn test_separation_pole_to_equator() {
        let pole = SkyCoord::from_degrees(0.0, 90.0);
        let eq = SkyCoord::from_degrees(123.0, 0.0);
        assert_relative_eq!(pole.separation(&eq).as_degrees(), 90.0, epsilon = 1e-10);
    }

    #[test]
    fn test_separation_antipodal() {
        let a = SkyCoord::from_degrees(0.0, 0.0);
        let b = SkyCoord::from_degrees(180.0, 0.0);
        assert_relative_eq!(a.separation(&b).as_degrees(), 180.0, epsilon = 1e-10);
    }

    #[test]
    fn test_separation_is_symmetric() {
        let a = SkyCoord::from_degrees(83.63, 22.01);
        let b = SkyCoord::from_degrees(85.0, 20.5);
        assert_relative_eq!(
            a.separation(&b).as_radians(),
            b.separation(&a).as_radians(),
            epsilon = 1e-14
        );
    }

    #[test]
    fn test_separation_wraps_longitude() {
        let a = SkyCoord::from_degrees(359.5, 0.0);
        let b = SkyCoord::from_degrees(0.5, 0.0);
        assert_relative_eq!(a.separation(&b).as_degrees(), 1.0, epsilon = 1e-10);
    }
}
