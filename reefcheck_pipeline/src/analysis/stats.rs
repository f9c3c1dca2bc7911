//! Small descriptive statistics used by the site aggregator.

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample (n - 1) standard deviation.
///
/// A single value has no variance; this returns `Some(0.0)` for it rather
/// than dividing by zero. `None` for an empty slice.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    if values.len() < 2 {
        return Some(0.0);
    }
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Round half away from zero to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[22.5, 17.5]), Some(20.0));
    }

    #[test]
    fn test_sample_std_dev_of_two_values() {
        // (22.5 - 20)^2 + (17.5 - 20)^2 = 12.5, / (2 - 1), sqrt
        let sd = sample_std_dev(&[22.5, 17.5]).expect("non-empty");
        assert_relative_eq!(sd, 12.5f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_single_value_has_zero_std_dev() {
        assert_eq!(sample_std_dev(&[42.0]), Some(0.0));
        assert_eq!(sample_std_dev(&[]), None);
    }

    #[test]
    fn test_round_to_two_places() {
        assert_eq!(round_to(3.535533905932738, 2), 3.54);
        assert_eq!(round_to(22.5, 2), 22.5);
        assert_eq!(round_to(-1.005001, 2), -1.01);
    }
}
