//! Numeric normalization to the table's storage convention

/// Buckets per hour for completion times
const DURATION_BUCKETS_PER_HOUR: f64 = 4.0;

/// Round a completion time up to the next quarter hour
///
/// Never rounds down: 10.1h becomes 10.25h, exact quarters are kept.
pub fn normalize_duration(hours: f64) -> f64 {
    (hours * DURATION_BUCKETS_PER_HOUR).ceil() / DURATION_BUCKETS_PER_HOUR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_up_to_quarter_hour() {
        assert_eq!(normalize_duration(10.1), 10.25);
        assert_eq!(normalize_duration(0.01), 0.25);
        assert_eq!(normalize_duration(7.26), 7.5);
        assert_eq!(normalize_duration(7.76), 8.0);
    }

    #[test]
    fn test_exact_quarters_unchanged() {
        assert_eq!(normalize_duration(10.0), 10.0);
        assert_eq!(normalize_duration(10.25), 10.25);
        assert_eq!(normalize_duration(0.0), 0.0);
    }
}
