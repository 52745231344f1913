//! Geographical coordinates

use serde::{Deserialize, Serialize};

/// A timestamped geographical coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationPoint {
    /// Epoch timestamp in milliseconds
    pub timestamp: i64,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

impl LocationPoint {
    /// Create a new location point
    pub fn new(timestamp: i64, latitude: f64, longitude: f64) -> Self {
        Self {
            timestamp,
            latitude,
            longitude,
        }
    }

    /// Placeholder point at (0, 0) used when no location was configured
    pub fn unknown_at(timestamp: i64) -> Self {
        Self::new(timestamp, 0.0, 0.0)
    }

    /// Linear interpolation towards `other`, `fraction` in [0, 1]
    pub fn lerp(&self, other: &LocationPoint, fraction: f64) -> Self {
        let fraction = fraction.clamp(0.0, 1.0);
        let dt = (other.timestamp - self.timestamp) as f64 * fraction;
        Self {
            timestamp: self.timestamp + dt.round() as i64,
            latitude: self.latitude + (other.latitude - self.latitude) * fraction,
            longitude: self.longitude + (other.longitude - self.longitude) * fraction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_location() {
        let point = LocationPoint::unknown_at(1_000);
        assert_eq!(point.timestamp, 1_000);
        assert_eq!(point.latitude, 0.0);
        assert_eq!(point.longitude, 0.0);
    }

    #[test]
    fn test_lerp_midpoint() {
        let a = LocationPoint::new(0, 10.0, 20.0);
        let b = LocationPoint::new(1_000, 12.0, 24.0);
        let mid = a.lerp(&b, 0.5);
        assert_eq!(mid.timestamp, 500);
        assert!((mid.latitude - 11.0).abs() < 1e-9);
        assert!((mid.longitude - 22.0).abs() < 1e-9);
    }

    #[test]
    fn test_lerp_clamps_fraction() {
        let a = LocationPoint::new(0, 0.0, 0.0);
        let b = LocationPoint::new(100, 1.0, 1.0);
        assert_eq!(a.lerp(&b, 2.0), b);
    }
}
