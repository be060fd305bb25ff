//! Per-group performance summary.
//!
//! The score is cumulative return over its standard deviation: a Sharpe-like
//! ratio without annualization and without a risk-free rate.

use salou_traits::stats::{MIN_STD_THRESHOLD, finite_mean};
use salou_traits::{Date, GroupSummary, QualityMetric, SecurityOutcome};

/// Risk-adjusted score of one security.
///
/// `None` when the standard deviation is zero or not finite, or when the
/// ratio itself is not finite. Undefined scores are dropped, never replaced
/// by a sentinel.
///
/// # Example
///
/// ```rust
/// use salou_eval::risk_adjusted_score;
///
/// assert_eq!(risk_adjusted_score(0.1, 0.05), Some(2.0));
/// assert_eq!(risk_adjusted_score(0.1, 0.0), None);
/// assert_eq!(risk_adjusted_score(0.1, f64::NAN), None);
/// ```
#[must_use]
pub fn risk_adjusted_score(cumulative_return: f64, return_std_dev: f64) -> Option<f64> {
    if !return_std_dev.is_finite() || return_std_dev.abs() <= MIN_STD_THRESHOLD {
        return None;
    }
    let score = cumulative_return / return_std_dev;
    score.is_finite().then_some(score)
}

/// Mean score per group for one (date, metric) pair.
///
/// Always returns `n_groups` summaries, labelled `1..=n_groups`. A group whose
/// members all lack a score reports `mean_score: None`.
#[must_use]
pub fn summarize(
    report_date: Date,
    metric: QualityMetric,
    n_groups: usize,
    outcomes: &[SecurityOutcome],
) -> Vec<GroupSummary> {
    (1..=n_groups as u32)
        .map(|group| {
            let scores: Vec<f64> = outcomes
                .iter()
                .filter(|o| o.group == group)
                .filter_map(|o| o.score)
                .collect();

            GroupSummary {
                report_date,
                metric,
                group,
                mean_score: finite_mean(&scores),
                contributors: scores.len(),
            }
        })
        .collect()
}

/// Top group mean minus bottom group mean, when both are defined.
#[must_use]
pub fn top_minus_bottom(groups: &[GroupSummary]) -> Option<f64> {
    let bottom = groups.iter().min_by_key(|g| g.group)?;
    let top = groups.iter().max_by_key(|g| g.group)?;
    if top.group == bottom.group {
        return None;
    }
    Some(top.mean_score? - bottom.mean_score?)
}
