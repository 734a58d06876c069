/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Computes the population standard deviation given a pre-computed mean.
/// Returns 0.0 for empty input.
pub fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;

    variance.sqrt()
}

/// Linear-interpolated percentile, `p` in 0.0–1.0. Returns 0.0 for empty input.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let pos = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;

    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Observed range of one metric across a pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

impl Extent {
    pub fn of(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values.into_iter().fold(None, |acc, v| match acc {
            None => Some(Extent { min: v, max: v }),
            Some(e) => Some(Extent {
                min: e.min.min(v),
                max: e.max.max(v),
            }),
        })
    }

    /// Min-max scales `v` into 0.0–1.0. A degenerate extent (max == min)
    /// maps everything to 0.0.
    pub fn scale(&self, v: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((v - self.min) / span).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_stddev() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[2.0, 4.0]), 3.0);
        assert_eq!(stddev(&[], 0.0), 0.0);
        assert_eq!(stddev(&[2.0, 4.0], 3.0), 1.0);
    }

    #[test]
    fn test_percentile_interpolates() {
        let values = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 1.0), 4.0);
        assert_eq!(percentile(&values, 0.5), 2.5);
        assert_eq!(percentile(&[], 0.5), 0.0);
        assert_eq!(percentile(&[7.0], 0.9), 7.0);
    }

    #[test]
    fn test_extent_scale() {
        let e = Extent::of([2.0, 6.0, 4.0]).unwrap();
        assert_eq!(e.min, 2.0);
        assert_eq!(e.max, 6.0);
        assert_eq!(e.scale(2.0), 0.0);
        assert_eq!(e.scale(4.0), 0.5);
        assert_eq!(e.scale(6.0), 1.0);
    }

    #[test]
    fn test_degenerate_extent_scales_to_zero() {
        let e = Extent::of([5.0, 5.0]).unwrap();
        assert_eq!(e.scale(5.0), 0.0);
        assert!(Extent::of(std::iter::empty()).is_none());
    }
}
