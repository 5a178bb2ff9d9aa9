use serde::Serialize;

/// Arithmetic mean. An empty slice yields 0.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Pearson product-moment correlation.
///
/// Returns 0 when the series differ in length, hold fewer than two points,
/// or either series has no variance.
pub fn pearson_correlation(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.len() != ys.len() || xs.len() < 2 {
        return 0.0;
    }
    if is_constant(xs) || is_constant(ys) {
        return 0.0;
    }

    let n = xs.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx, mut sum_yy) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
        sum_yy += y * y;
    }

    let numerator = n * sum_xy - sum_x * sum_y;
    let denominator = ((n * sum_xx - sum_x * sum_x) * (n * sum_yy - sum_y * sum_y)).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    (numerator / denominator).clamp(-1.0, 1.0)
}

// One-pass sums do not cancel exactly for constant fractions like 74.3.
fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|value| *value == values[0])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CorrelationStrength {
    Strong,
    Moderate,
    Weak,
}

impl CorrelationStrength {
    pub fn of(r: f64) -> Self {
        match r.abs() {
            a if a > 0.7 => CorrelationStrength::Strong,
            a if a > 0.4 => CorrelationStrength::Moderate,
            _ => CorrelationStrength::Weak,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CorrelationStrength::Strong => "Strong",
            CorrelationStrength::Moderate => "Moderate",
            CorrelationStrength::Weak => "Weak",
        }
    }
}

/// Score range `[lower, upper)`, or `[lower, upper]` when `closed` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub label: String,
    pub lower: f64,
    pub upper: f64,
    pub closed: bool,
}

impl Bucket {
    pub fn half_open(label: &str, lower: f64, upper: f64) -> Self {
        Self {
            label: label.to_string(),
            lower,
            upper,
            closed: false,
        }
    }

    pub fn closed(label: &str, lower: f64, upper: f64) -> Self {
        Self {
            closed: true,
            ..Self::half_open(label, lower, upper)
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && (value < self.upper || (self.closed && value == self.upper))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketCount {
    pub label: String,
    pub count: usize,
}

/// Counts values per bucket, in bucket order. A value lands in the first
/// bucket containing it; values outside every bucket are not counted.
pub fn histogram(values: &[f64], buckets: &[Bucket]) -> Vec<BucketCount> {
    let mut counts = vec![0usize; buckets.len()];
    for value in values {
        if let Some(index) = buckets.iter().position(|bucket| bucket.contains(*value)) {
            counts[index] += 1;
        }
    }

    buckets
        .iter()
        .zip(counts)
        .map(|(bucket, count)| BucketCount {
            label: bucket.label.clone(),
            count,
        })
        .collect()
}

/// Assessment score bands of the distribution chart, highest first.
pub fn score_buckets() -> Vec<Bucket> {
    vec![
        Bucket::closed("90-100", 90.0, 100.0),
        Bucket::half_open("80-89", 80.0, 90.0),
        Bucket::half_open("70-79", 70.0, 80.0),
        Bucket::half_open("60-69", 60.0, 70.0),
        Bucket::half_open("Below 60", 0.0, 60.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[2.0, 4.0, 9.0]), 5.0);
    }

    #[test]
    fn correlation_of_two_rising_points_is_one() {
        let r = pearson_correlation(&[75.2, 82.1], &[74.3, 82.8]);
        assert!(r > 0.99, "r = {r}");
        assert!(r <= 1.0);
    }

    #[test]
    fn correlation_is_symmetric_and_bounded() {
        let series = [
            (vec![1.0, 2.0, 3.0, 4.0, 5.0], vec![2.0, 1.0, 4.0, 3.0, 6.0]),
            (vec![10.0, 20.0, 30.0], vec![9.0, 5.0, 1.0]),
            (vec![68.9, 91.3, 77.8, 75.2], vec![67.5, 90.8, 77.1, 74.3]),
        ];
        for (xs, ys) in &series {
            let forward = pearson_correlation(xs, ys);
            let backward = pearson_correlation(ys, xs);
            assert!((forward - backward).abs() < 1e-12);
            assert!((-1.0..=1.0).contains(&forward));
        }
        assert!((pearson_correlation(&series[1].0, &series[1].1) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_variance_falls_back_to_zero() {
        assert_eq!(pearson_correlation(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(pearson_correlation(&[1.0, 2.0, 3.0], &[7.0, 7.0, 7.0]), 0.0);
    }

    #[test]
    fn constant_fractional_columns_correlate_to_exactly_zero() {
        for constant in [74.3, 0.1, 68.9, 82.8, 91.3] {
            for n in 2..12 {
                let flat = vec![constant; n];
                let ramp: Vec<f64> = (0..n).map(|i| 60.0 + i as f64 * 3.7).collect();
                assert_eq!(pearson_correlation(&flat, &ramp), 0.0, "{constant} x {n}");
                assert_eq!(pearson_correlation(&ramp, &flat), 0.0, "{constant} x {n}");
            }
        }
    }

    #[test]
    fn degenerate_inputs_fall_back_to_zero() {
        assert_eq!(pearson_correlation(&[1.0], &[2.0]), 0.0);
        assert_eq!(pearson_correlation(&[1.0, 2.0], &[2.0]), 0.0);
        assert_eq!(pearson_correlation(&[], &[]), 0.0);
    }

    #[test]
    fn strength_labels_follow_thresholds() {
        assert_eq!(CorrelationStrength::of(0.71), CorrelationStrength::Strong);
        assert_eq!(CorrelationStrength::of(-0.8), CorrelationStrength::Strong);
        assert_eq!(CorrelationStrength::of(0.7), CorrelationStrength::Moderate);
        assert_eq!(CorrelationStrength::of(0.4), CorrelationStrength::Weak);
    }

    #[test]
    fn top_bucket_is_closed() {
        let counts = histogram(&[100.0, 90.0, 89.99, 60.0, 59.9, 0.0], &score_buckets());
        let by_label: Vec<(&str, usize)> =
            counts.iter().map(|c| (c.label.as_str(), c.count)).collect();
        assert_eq!(
            by_label,
            vec![("90-100", 2), ("80-89", 1), ("70-79", 0), ("60-69", 1), ("Below 60", 2)]
        );
    }

    #[test]
    fn out_of_range_values_are_not_counted() {
        let counts = histogram(&[-3.0, 100.5, f64::NAN], &score_buckets());
        assert!(counts.iter().all(|c| c.count == 0));
    }
}
