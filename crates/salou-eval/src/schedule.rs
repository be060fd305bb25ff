//! Rebalance schedule.
//!
//! Each report date opens a holding period that starts on the first day of
//! the following month and ends on the last day of the third month after the
//! report month. A buffer of `k` months shifts both ends by `k`.

use chrono::{Datelike, Months};
use salou_traits::{Date, QualityRatio, RebalanceWindow, Result, SalouError};
use std::collections::BTreeSet;

/// Derives the holding period for one report date.
///
/// # Errors
///
/// Returns [`SalouError::InvalidDate`] if the window falls outside the
/// representable calendar.
///
/// # Example
///
/// ```rust
/// use salou_eval::rebalance_window;
/// use salou_traits::Date;
///
/// let report = Date::from_ymd_opt(2023, 3, 31).unwrap();
/// let window = rebalance_window(report, 0).unwrap();
/// assert_eq!(window.buy_date, Date::from_ymd_opt(2023, 4, 1).unwrap());
/// assert_eq!(window.sell_date, Date::from_ymd_opt(2023, 6, 30).unwrap());
/// ```
pub fn rebalance_window(report_date: Date, buffer_months: u32) -> Result<RebalanceWindow> {
    let out_of_range = || SalouError::InvalidDate(format!("window for {report_date} overflows"));

    let base = report_date.with_day(1).ok_or_else(out_of_range)?;
    let buy_offset = buffer_months.checked_add(1).ok_or_else(out_of_range)?;
    let sell_offset = buffer_months.checked_add(4).ok_or_else(out_of_range)?;
    let buy_date = base
        .checked_add_months(Months::new(buy_offset))
        .ok_or_else(out_of_range)?;
    let sell_date = base
        .checked_add_months(Months::new(sell_offset))
        .and_then(|next| next.pred_opt())
        .ok_or_else(out_of_range)?;

    Ok(RebalanceWindow {
        report_date,
        buy_date,
        sell_date,
    })
}

/// Distinct report dates of the ratio table, ascending, restricted to
/// `[start, end]` when given.
#[must_use]
pub fn report_dates(ratios: &[QualityRatio], start: Option<Date>, end: Option<Date>) -> Vec<Date> {
    ratios
        .iter()
        .map(|r| r.period_end_date)
        .filter(|d| start.is_none_or(|s| *d >= s) && end.is_none_or(|e| *d <= e))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// One window per report date, in the order given.
///
/// Windows are neither merged nor deduplicated, even when they overlap.
///
/// # Errors
///
/// Propagates the first [`rebalance_window`] failure.
pub fn schedule(dates: &[Date], buffer_months: u32) -> Result<Vec<RebalanceWindow>> {
    dates
        .iter()
        .map(|&d| rebalance_window(d, buffer_months))
        .collect()
}
