//! Quantile grouping of a cross-section.
//!
//! Buckets are cut by population, not by value range: after sorting, rank `r`
//! out of `count` lands in bucket `floor(r * n / count) + 1`. Bucket sizes are
//! therefore `floor(count / n)` or `ceil(count / n)` however skewed the values
//! are. Equal values are ordered by their position in the cross-section, so
//! ties may straddle a bucket boundary.

use salou_traits::{Date, GroupAssignment, QualityMetric, QualityRatio, Result, SalouError};

/// Labels each value with its bucket in `1..=n_groups`, ascending.
///
/// Returns `None` when there are fewer values than buckets. Callers are
/// expected to have removed non-finite values already.
///
/// # Example
///
/// ```rust
/// use salou_eval::quantile_labels;
///
/// let labels = quantile_labels(&[0.03, 0.01, 0.05, 0.02, 0.04], 5).unwrap();
/// assert_eq!(labels, vec![3, 1, 5, 2, 4]);
/// ```
#[must_use]
pub fn quantile_labels(values: &[f64], n_groups: usize) -> Option<Vec<u32>> {
    let count = values.len();
    if n_groups == 0 || count < n_groups {
        return None;
    }

    let mut order: Vec<usize> = (0..count).collect();
    // sort_by is stable: equal values keep cross-section order
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut labels = vec![0_u32; count];
    for (rank, &idx) in order.iter().enumerate() {
        labels[idx] = (rank * n_groups / count) as u32 + 1;
    }
    Some(labels)
}

/// Ratio rows reported on `report_date`, in table order.
#[must_use]
pub fn cross_section(ratios: &[QualityRatio], report_date: Date) -> Vec<&QualityRatio> {
    ratios
        .iter()
        .filter(|r| r.period_end_date == report_date)
        .collect()
}

/// Splits a cross-section into equal-population buckets by one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantileGrouper {
    n_groups: usize,
}

impl QuantileGrouper {
    /// Create a grouper producing `n_groups` buckets.
    #[must_use]
    pub const fn new(n_groups: usize) -> Self {
        Self { n_groups }
    }

    /// Number of buckets.
    #[must_use]
    pub const fn n_groups(&self) -> usize {
        self.n_groups
    }

    /// Assigns every security with a finite `metric` value to a bucket.
    ///
    /// Non-finite values are removed before cutting, so they never move a
    /// boundary. The returned assignments keep the cross-section's order.
    ///
    /// # Errors
    ///
    /// [`SalouError::InsufficientPopulation`] when fewer than `n_groups`
    /// finite values remain.
    pub fn assign(
        &self,
        cross_section: &[&QualityRatio],
        report_date: Date,
        metric: QualityMetric,
    ) -> Result<Vec<GroupAssignment>> {
        let finite: Vec<(&QualityRatio, f64)> = cross_section
            .iter()
            .map(|r| (*r, r.value(metric)))
            .filter(|(_, v)| v.is_finite())
            .collect();

        let values: Vec<f64> = finite.iter().map(|(_, v)| *v).collect();
        let labels = quantile_labels(&values, self.n_groups).ok_or(
            SalouError::InsufficientPopulation {
                report_date,
                metric,
                required: self.n_groups,
                available: values.len(),
            },
        )?;

        Ok(finite
            .into_iter()
            .zip(labels)
            .map(|((ratio, _), group)| GroupAssignment {
                security_id: ratio.security_id.clone(),
                report_date,
                metric,
                group,
            })
            .collect())
    }
}

impl Default for QuantileGrouper {
    fn default() -> Self {
        Self::new(5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use salou_traits::ReportKind;

    fn date() -> Date {
        Date::from_ymd_opt(2023, 3, 31).unwrap()
    }

    fn ratio(id: &str, roe: f64) -> QualityRatio {
        QualityRatio {
            security_id: id.to_string(),
            period_end_date: date(),
            report_kind: ReportKind::Q1,
            net_margin: 0.0,
            operating_margin: 0.0,
            return_on_equity: roe,
            return_on_assets: 0.0,
        }
    }

    fn group_sizes(labels: &[u32], n: usize) -> Vec<usize> {
        (1..=n as u32)
            .map(|g| labels.iter().filter(|&&l| l == g).count())
            .collect()
    }

    #[test]
    fn test_ascending_ranks_map_to_groups() {
        let labels = quantile_labels(&[0.01, 0.02, 0.03, 0.04, 0.05], 5).unwrap();
        assert_eq!(labels, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_sizes_differ_by_at_most_one() {
        for count in 5..60 {
            // skewed values: most mass near zero, one large outlier
            let values: Vec<f64> = (0..count)
                .map(|i| if i == count - 1 { 1e6 } else { (i as f64).powi(3) * 1e-6 })
                .collect();
            let labels = quantile_labels(&values, 5).unwrap();
            let sizes = group_sizes(&labels, 5);
            let min = *sizes.iter().min().unwrap();
            let max = *sizes.iter().max().unwrap();
            assert!(min >= 1, "count {count}: {sizes:?}");
            assert!(max - min <= 1, "count {count}: {sizes:?}");
            assert_eq!(min, count / 5);
        }
    }

    #[test]
    fn test_ties_keep_population_split() {
        let labels = quantile_labels(&[0.1; 10], 5).unwrap();
        assert_eq!(group_sizes(&labels, 5), vec![2, 2, 2, 2, 2]);
        assert_eq!(labels, vec![1, 1, 2, 2, 3, 3, 4, 4, 5, 5]);
    }

    #[test]
    fn test_too_few_values() {
        assert!(quantile_labels(&[0.1, 0.2, 0.3, 0.4], 5).is_none());
        assert!(quantile_labels(&[0.1], 0).is_none());
    }

    #[test]
    fn test_assign_highest_in_top_group() {
        let rows = vec![
            ratio("A", 0.05),
            ratio("B", 0.01),
            ratio("C", 0.04),
            ratio("D", 0.02),
            ratio("E", 0.03),
        ];
        let cross: Vec<&QualityRatio> = rows.iter().collect();
        let assignments = QuantileGrouper::default()
            .assign(&cross, date(), QualityMetric::ReturnOnEquity)
            .unwrap();

        let ids: Vec<(&str, u32)> = assignments
            .iter()
            .map(|a| (a.security_id.as_str(), a.group))
            .collect();
        assert_eq!(ids, vec![("A", 5), ("B", 1), ("C", 4), ("D", 2), ("E", 3)]);
    }

    #[test]
    fn test_non_finite_removed_before_cut() {
        let clean = vec![
            ratio("A", 0.05),
            ratio("B", 0.01),
            ratio("C", 0.04),
            ratio("D", 0.02),
            ratio("E", 0.03),
            ratio("F", 0.06),
            ratio("G", -0.01),
        ];
        let mut dirty = clean.clone();
        dirty.insert(2, ratio("X", f64::INFINITY));
        dirty.insert(5, ratio("Y", f64::NAN));

        let grouper = QuantileGrouper::new(5);
        let clean_refs: Vec<&QualityRatio> = clean.iter().collect();
        let dirty_refs: Vec<&QualityRatio> = dirty.iter().collect();
        let expected = grouper
            .assign(&clean_refs, date(), QualityMetric::ReturnOnEquity)
            .unwrap();
        let actual = grouper
            .assign(&dirty_refs, date(), QualityMetric::ReturnOnEquity)
            .unwrap();

        assert_eq!(expected, actual);
        assert!(actual.iter().all(|a| a.security_id != "X" && a.security_id != "Y"));
    }

    #[test]
    fn test_insufficient_population_error() {
        let rows = vec![
            ratio("A", 0.05),
            ratio("B", f64::NAN),
            ratio("C", 0.04),
            ratio("D", 0.02),
            ratio("E", 0.03),
        ];
        let cross: Vec<&QualityRatio> = rows.iter().collect();
        let err = QuantileGrouper::new(5)
            .assign(&cross, date(), QualityMetric::ReturnOnEquity)
            .unwrap_err();
        match err {
            SalouError::InsufficientPopulation {
                required,
                available,
                ..
            } => {
                assert_eq!(required, 5);
                assert_eq!(available, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cross_section_filters_date() {
        let mut other = ratio("Z", 0.2);
        other.period_end_date = Date::from_ymd_opt(2023, 6, 30).unwrap();
        let rows = vec![ratio("A", 0.1), other, ratio("B", 0.3)];
        let cross = cross_section(&rows, date());
        let ids: Vec<&str> = cross.iter().map(|r| r.security_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
    }
}
