//! Division helpers shared by every rate computation.

/// `numerator / denominator`, or 0 when the denominator is zero or the
/// result is not finite.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }

    let ratio = numerator / denominator;
    if ratio.is_finite() {
        ratio
    } else {
        0.0
    }
}

/// [`safe_ratio`] scaled to a percentage.
pub fn safe_percent(numerator: f64, denominator: f64) -> f64 {
    safe_ratio(numerator, denominator) * 100.0
}

/// Arithmetic mean, 0 for an empty input.
pub fn mean(values: &[f64]) -> f64 {
    safe_ratio(values.iter().sum(), values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_denominator_yields_zero() {
        assert_eq!(safe_ratio(3.0, 0.0), 0.0);
        assert_eq!(safe_ratio(0.0, 0.0), 0.0);
        assert_eq!(safe_percent(1.0, 0.0), 0.0);
    }

    #[test]
    fn test_non_finite_inputs_yield_zero() {
        assert_eq!(safe_ratio(f64::NAN, 2.0), 0.0);
        assert_eq!(safe_ratio(f64::INFINITY, 2.0), 0.0);
    }

    #[test]
    fn test_percent() {
        assert_eq!(safe_percent(1.0, 4.0), 25.0);
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[1.0, 0.5]), 0.75);
    }
}
