//! Summary statistics over collections of peak values.
//!
//! Percentiles use linear interpolation between closest ranks: for
//! percentile `p` over `n` sorted values the rank is `p / 100 * (n - 1)`,
//! and the result interpolates between the values at the floor and ceiling
//! of that rank.

use serde::{Deserialize, Serialize};

/// Arithmetic mean, or `None` for an empty slice.
#[allow(clippy::cast_precision_loss)]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Percentile `p` (0 to 100) of an already sorted slice.
///
/// Returns `None` for an empty slice or `p` outside `[0, 100]`.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn percentile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=100.0).contains(&p) {
        return None;
    }
    let last = sorted.len().checked_sub(1)?;
    let rank = p / 100.0 * last as f64;
    let lower = rank.floor();
    let lo = lower as usize;
    let hi = (rank.ceil() as usize).min(last);
    let a = *sorted.get(lo)?;
    let b = *sorted.get(hi)?;
    Some((rank - lower).mul_add(b - a, a))
}

/// Percentile `p` (0 to 100) of an unsorted slice.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    percentile_sorted(&sorted, p)
}

/// Mean and interquartile bounds of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Arithmetic mean.
    pub mean: f64,
    /// 25th percentile.
    pub lower_quartile: f64,
    /// 75th percentile.
    pub upper_quartile: f64,
}

impl SummaryStats {
    /// Compute the summary of `values` from scratch, or `None` when empty.
    pub fn of(values: &[f64]) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Some(Self {
            mean: mean(&sorted)?,
            lower_quartile: percentile_sorted(&sorted, 25.0)?,
            upper_quartile: percentile_sorted(&sorted, 75.0)?,
        })
    }

    /// Width of the interquartile range.
    pub fn interquartile_range(&self) -> f64 {
        self.upper_quartile - self.lower_quartile
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn quartiles_of_five_evenly_spaced_values() {
        let values = [100.0, 200.0, 300.0, 400.0, 500.0];
        assert_eq!(percentile(&values, 25.0), Some(200.0));
        assert_eq!(percentile(&values, 75.0), Some(400.0));
        let summary = SummaryStats::of(&values);
        assert_eq!(
            summary,
            Some(SummaryStats {
                mean: 300.0,
                lower_quartile: 200.0,
                upper_quartile: 400.0,
            })
        );
    }

    #[test]
    fn percentile_interpolates_between_ranks() {
        // rank = 0.25 * 3 = 0.75 -> 1 + 0.75 * (2 - 1)
        let values = [4.0, 1.0, 3.0, 2.0];
        assert!(percentile(&values, 25.0).is_some_and(|v| close(v, 1.75)));
        assert!(percentile(&values, 75.0).is_some_and(|v| close(v, 3.25)));
        assert!(percentile(&values, 50.0).is_some_and(|v| close(v, 2.5)));
    }

    #[test]
    fn percentile_extremes_are_min_and_max() {
        let values = [7.0, -2.0, 11.0];
        assert_eq!(percentile(&values, 0.0), Some(-2.0));
        assert_eq!(percentile(&values, 100.0), Some(11.0));
    }

    #[test]
    fn single_value_is_every_statistic() {
        let summary = SummaryStats::of(&[42.0]);
        assert_eq!(
            summary,
            Some(SummaryStats {
                mean: 42.0,
                lower_quartile: 42.0,
                upper_quartile: 42.0,
            })
        );
    }

    #[test]
    fn empty_input_has_no_statistics() {
        assert_eq!(mean(&[]), None);
        assert_eq!(percentile(&[], 50.0), None);
        assert_eq!(SummaryStats::of(&[]), None);
    }

    #[test]
    fn out_of_range_percentile() {
        assert_eq!(percentile(&[1.0, 2.0], 101.0), None);
        assert_eq!(percentile(&[1.0, 2.0], -1.0), None);
    }

    #[test]
    fn interquartile_range_width() {
        let summary = SummaryStats::of(&[100.0, 200.0, 300.0, 400.0, 500.0]);
        assert!(summary.is_some_and(|s| close(s.interquartile_range(), 200.0)));
    }
}
