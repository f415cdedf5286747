use geo::{GeodesicDistance, Point};

/// Calculate the geodesic distance between two points in kilometers
///
/// Uses the ellipsoidal-earth model (Karney's algorithm via the `geo`
/// crate), which stays accurate at the few-hundred-kilometer scale where
/// a flat-plane approximation drifts.
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn geodesic_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    // geo points are (x, y) = (lon, lat)
    let a = Point::new(lon1, lat1);
    let b = Point::new(lon2, lat2);

    a.geodesic_distance(&b) / 1000.0
}

/// Round a distance to two decimal places for reporting
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geodesic_zero_distance() {
        let distance = geodesic_km(25.0, 55.0, 25.0, 55.0);
        assert!(distance < 0.001, "Same point should be ~0km, got {}", distance);
    }

    #[test]
    fn test_geodesic_london_to_paris() {
        // Distance from London to Paris (approximately 344 km)
        let london_lat = 51.5074;
        let london_lon = -0.1278;
        let paris_lat = 48.8566;
        let paris_lon = 2.3522;

        let distance = geodesic_km(london_lat, london_lon, paris_lat, paris_lon);
        assert!((distance - 344.0).abs() < 5.0, "Distance should be ~344km, got {}", distance);
    }

    #[test]
    fn test_geodesic_symmetric() {
        let forward = geodesic_km(25.0, 55.0, 40.0, 55.0);
        let backward = geodesic_km(40.0, 55.0, 25.0, 55.0);
        assert!((forward - backward).abs() < 1e-9);
    }

    #[test]
    fn test_geodesic_small_step() {
        // 0.01 degrees of latitude is roughly 1.1 km
        let distance = geodesic_km(25.0, 55.0, 25.01, 55.0);
        assert!(distance > 1.0 && distance < 1.2, "Expected ~1.1km, got {}", distance);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.1066), 1.11);
        assert_eq!(round2(5.0), 5.0);
        assert_eq!(round2(1666.6666), 1666.67);
    }
}
