/// Standard gravitational acceleration in m/s².
pub const STANDARD_GRAVITY: f64 = 9.80665;

/// Default density of seawater in kg/m³.
pub const DEFAULT_SEAWATER_DENSITY: f64 = 1030.0;

/// Inverse-barometer response in meters to a sea-level-pressure anomaly
/// (Wunsch and Stammer, 1997): a 1 hPa increase over the mean depresses
/// the sea surface by roughly one centimeter.
pub fn ib_response(pressure: f64, reference: f64, density: f64) -> f64 {
    -(pressure - reference) / (density * STANDARD_GRAVITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_anomaly_gives_zero_response() {
        assert_eq!(ib_response(101_325.0, 101_325.0, DEFAULT_SEAWATER_DENSITY), 0.0);
    }

    #[test]
    fn test_positive_anomaly_depresses_surface() {
        let ib = ib_response(102_325.0, 101_325.0, DEFAULT_SEAWATER_DENSITY);
        // 10 hPa anomaly, about -9.9 cm
        assert!((ib - (-1000.0 / (1030.0 * STANDARD_GRAVITY))).abs() < 1e-12);
        assert!(ib < 0.0);
    }

    #[test]
    fn test_negative_anomaly_raises_surface() {
        let ib = ib_response(100_325.0, 101_325.0, DEFAULT_SEAWATER_DENSITY);
        assert!(ib > 0.0);
    }

    #[test]
    fn test_density_scales_response() {
        let thin = ib_response(102_325.0, 101_325.0, 1000.0);
        let dense = ib_response(102_325.0, 101_325.0, 1100.0);
        assert!(thin.abs() > dense.abs());
    }
}
