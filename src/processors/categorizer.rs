use crate::models::TemperatureBucket;

/// Buckets a temperature in °C. Lower bounds are inclusive, upper bounds
/// exclusive; no rounding is applied. Missing and NaN readings are `Unknown`.
pub fn categorize(temp: Option<f64>) -> TemperatureBucket {
    match temp {
        None => TemperatureBucket::Unknown,
        Some(t) if t.is_nan() => TemperatureBucket::Unknown,
        Some(t) if t < 10.0 => TemperatureBucket::Below10,
        Some(t) if t < 20.0 => TemperatureBucket::From10To20,
        Some(t) if t < 30.0 => TemperatureBucket::From20To30,
        Some(_) => TemperatureBucket::AtLeast30,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries() {
        assert_eq!(categorize(None), TemperatureBucket::Unknown);
        assert_eq!(categorize(Some(9.999)), TemperatureBucket::Below10);
        assert_eq!(categorize(Some(10.0)), TemperatureBucket::From10To20);
        assert_eq!(categorize(Some(19.999)), TemperatureBucket::From10To20);
        assert_eq!(categorize(Some(20.0)), TemperatureBucket::From20To30);
        assert_eq!(categorize(Some(29.999)), TemperatureBucket::From20To30);
        assert_eq!(categorize(Some(30.0)), TemperatureBucket::AtLeast30);
    }

    #[test]
    fn test_labels() {
        assert_eq!(categorize(Some(-5.0)).label(), "<10°C");
        assert_eq!(categorize(Some(15.0)).label(), "10–20°C");
        assert_eq!(categorize(Some(25.0)).label(), "20–30°C");
        assert_eq!(categorize(Some(45.0)).label(), "≥30°C");
        assert_eq!(categorize(None).label(), "Unknown");
    }

    #[test]
    fn test_extremes_and_nan() {
        assert_eq!(categorize(Some(f64::NEG_INFINITY)), TemperatureBucket::Below10);
        assert_eq!(categorize(Some(f64::INFINITY)), TemperatureBucket::AtLeast30);
        assert_eq!(categorize(Some(f64::NAN)), TemperatureBucket::Unknown);
    }

    #[test]
    fn test_monotonic_over_known_range() {
        let mut previous = categorize(Some(-60.0));
        let mut t = -60.0;
        while t <= 60.0 {
            let current = categorize(Some(t));
            assert_ne!(current, TemperatureBucket::Unknown);
            assert!(current >= previous, "bucket went backwards at {}", t);
            previous = current;
            t += 0.25;
        }
    }
}
