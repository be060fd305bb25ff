//! Statistical helpers shared by the aggregation and summary stages.

use crate::Date;
use ndarray::Array1;

/// Minimum threshold for standard deviation to avoid division by zero.
/// Values at or below this threshold are treated as zero variance.
pub const MIN_STD_THRESHOLD: f64 = 1e-12;

/// Sum and dispersion of a daily return series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStats {
    /// Number of finite observations.
    pub n: usize,
    /// Sum of the finite observations.
    pub sum: f64,
    /// Sample standard deviation (N-1 denominator), NaN when `n < 2`.
    pub std: f64,
}

/// Reduces a return series to its sum and sample standard deviation.
///
/// Non-finite observations are skipped, the way a provider's missing days
/// would be. Returns `None` when nothing finite is left.
///
/// # Examples
///
/// ```
/// use salou_traits::stats::series_stats;
///
/// let stats = series_stats(&[0.01, -0.02, 0.015]).unwrap();
/// assert_eq!(stats.n, 3);
/// assert!((stats.sum - 0.005).abs() < 1e-12);
/// ```
pub fn series_stats(values: &[f64]) -> Option<SeriesStats> {
    let finite: Array1<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
    let n = finite.len();
    if n == 0 {
        return None;
    }

    let sum = finite.sum();
    // Bessel's correction needs at least two points
    let std = if n > 1 { finite.std(1.0) } else { f64::NAN };

    Some(SeriesStats { n, sum, std })
}

/// Arithmetic mean of the finite values, `None` when there are none.
pub fn finite_mean(values: &[f64]) -> Option<f64> {
    let finite: Array1<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
    finite.mean()
}

/// Close-to-close changes for the trading days in `[start, end]`.
///
/// `closes` must be sorted by date. The first day of the window is measured
/// against the last close before `start` when there is one, otherwise it
/// contributes no return.
pub fn close_to_close(closes: &[(Date, f64)], start: Date, end: Date) -> Vec<f64> {
    closes
        .windows(2)
        .filter(|pair| pair[1].0 >= start && pair[1].0 <= end)
        .map(|pair| pair[1].1 / pair[0].1 - 1.0)
        .collect()
}
