//! Statistics Calculator Module
//! Medians, per-manufacturer price summaries and histogram binning.

use statrs::statistics::Statistics;

/// Price summary of one manufacturer's listings.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStats {
    pub group_name: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for GroupStats {
    fn default() -> Self {
        Self {
            group_name: String::new(),
            count: 0,
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// The two manufacturers of the price overlay, side by side.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSummary {
    pub first: GroupStats,
    pub second: GroupStats,
}

/// Equal-width bins: bin `i` covers `[start + i*width, start + (i+1)*width)`,
/// the last one closed on the right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinEdges {
    pub start: f64,
    pub width: f64,
    pub count: usize,
}

impl BinEdges {
    /// Bins spanning `[min, max]` of every value given, or `None` when no
    /// finite value is present or `count` is zero.
    pub fn spanning<'a>(values: impl IntoIterator<Item = &'a f64>, count: usize) -> Option<Self> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in values {
            if v.is_finite() {
                min = min.min(v);
                max = max.max(v);
            }
        }
        if count == 0 || min > max {
            return None;
        }

        if min == max {
            // Single distinct value: one unit wide bins centred on it
            return Some(Self {
                start: min - count as f64 / 2.0,
                width: 1.0,
                count,
            });
        }

        Some(Self {
            start: min,
            width: (max - min) / count as f64,
            count,
        })
    }

    pub fn end(&self) -> f64 {
        self.start + self.width * self.count as f64
    }

    /// Left edge of bin `i`.
    pub fn left(&self, i: usize) -> f64 {
        self.start + self.width * i as f64
    }

    /// Centre of bin `i`.
    pub fn center(&self, i: usize) -> f64 {
        self.left(i) + self.width / 2.0
    }

    /// Bin holding `value`, if it lies inside the range.
    pub fn index_of(&self, value: f64) -> Option<usize> {
        if !value.is_finite() || value < self.start || value > self.end() {
            return None;
        }
        let idx = ((value - self.start) / self.width).floor() as usize;
        Some(idx.min(self.count - 1))
    }
}

/// Handles statistical calculations.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Median of `values`; the mean of the two middle values for even
    /// lengths. `None` for an empty slice.
    pub fn median(values: &[f64]) -> Option<f64> {
        let n = values.len();
        if n == 0 {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        Some(if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        })
    }

    /// Count, mean, median, sample standard deviation and range of `values`.
    /// An empty sample keeps its name and reports NaN everywhere else.
    pub fn compute_descriptive_stats(group_name: &str, values: &[f64]) -> GroupStats {
        let Some(median) = Self::median(values) else {
            return GroupStats {
                group_name: group_name.to_string(),
                ..GroupStats::default()
            };
        };

        GroupStats {
            group_name: group_name.to_string(),
            count: values.len(),
            mean: values.mean(),
            median,
            std: if values.len() > 1 { values.std_dev() } else { 0.0 },
            min: Statistics::min(values),
            max: Statistics::max(values),
        }
    }

    /// Count values per bin. Values outside the bin range are ignored.
    pub fn histogram(values: &[f64], bins: &BinEdges) -> Vec<f64> {
        let mut counts = vec![0.0; bins.count];
        for idx in values.iter().filter_map(|&v| bins.index_of(v)) {
            counts[idx] += 1.0;
        }
        counts
    }

    /// Each count as a percentage of the total. All-zero input stays zero.
    pub fn normalize_percent(counts: &[f64]) -> Vec<f64> {
        let total: f64 = counts.iter().sum();
        if total == 0.0 {
            return counts.to_vec();
        }
        counts.iter().map(|c| c / total * 100.0).collect()
    }

    /// Price summaries of the two overlaid manufacturers.
    pub fn price_summary(
        first_name: &str,
        first: &[f64],
        second_name: &str,
        second: &[f64],
    ) -> PriceSummary {
        PriceSummary {
            first: Self::compute_descriptive_stats(first_name, first),
            second: Self::compute_descriptive_stats(second_name, second),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_of_odd_and_even_lengths() {
        assert_eq!(StatsCalculator::median(&[5.0, 1.0, 3.0]), Some(3.0));
        assert_eq!(StatsCalculator::median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(StatsCalculator::median(&[]), None);
    }

    #[test]
    fn descriptive_stats_of_a_sample() {
        let stats = StatsCalculator::compute_descriptive_stats("ford", &[4.0, 1.0, 5.0, 2.0, 3.0]);
        assert_eq!(stats.group_name, "ford");
        assert_eq!(stats.count, 5);
        assert!((stats.mean - 3.0).abs() < 1e-12);
        assert_eq!(stats.median, 3.0);
        assert!((stats.std - 2.5f64.sqrt()).abs() < 1e-12);
        assert_eq!((stats.min, stats.max), (1.0, 5.0));
    }

    #[test]
    fn single_listing_has_zero_spread() {
        let stats = StatsCalculator::compute_descriptive_stats("kia", &[4000.0]);
        assert_eq!(stats.count, 1);
        assert_eq!(stats.std, 0.0);
        assert_eq!((stats.min, stats.max), (4000.0, 4000.0));
    }

    #[test]
    fn descriptive_stats_of_empty_sample() {
        let stats = StatsCalculator::compute_descriptive_stats("none", &[]);
        assert_eq!(stats.count, 0);
        assert!(stats.mean.is_nan());
    }

    #[test]
    fn histogram_counts_every_in_range_value() {
        let values = [0.0, 1.0, 2.5, 5.0, 7.5, 10.0];
        let bins = BinEdges::spanning(&values, 4).unwrap();
        assert_eq!(bins.start, 0.0);
        assert_eq!(bins.width, 2.5);

        let counts = StatsCalculator::histogram(&values, &bins);
        assert_eq!(counts, vec![2.0, 1.0, 1.0, 2.0]);
        assert_eq!(counts.iter().sum::<f64>(), values.len() as f64);

        // Shared bins ignore values outside their range
        let outside = StatsCalculator::histogram(&[-1.0, 3.0, 11.0], &bins);
        assert_eq!(outside.iter().sum::<f64>(), 1.0);
    }

    #[test]
    fn bins_for_a_single_distinct_value() {
        let bins = BinEdges::spanning(&[7.0, 7.0], 2).unwrap();
        assert_eq!(StatsCalculator::histogram(&[7.0, 7.0], &bins).iter().sum::<f64>(), 2.0);
        assert!(BinEdges::spanning(&Vec::<f64>::new(), 10).is_none());
        assert!(BinEdges::spanning(&[1.0], 0).is_none());
    }

    #[test]
    fn percent_normalization_sums_to_hundred() {
        let percent = StatsCalculator::normalize_percent(&[1.0, 3.0, 0.0, 4.0]);
        assert_eq!(percent, vec![12.5, 37.5, 0.0, 50.0]);
        assert_eq!(StatsCalculator::normalize_percent(&[0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn price_summary_keeps_selection_order() {
        let summary = StatsCalculator::price_summary("ford", &[10.0, 30.0], "bmw", &[]);
        assert_eq!(summary.first.group_name, "ford");
        assert_eq!(summary.first.median, 20.0);
        assert_eq!(summary.second.group_name, "bmw");
        assert_eq!(summary.second.count, 0);
    }
}
