//! Ratio derivation from financial statements.

use salou_traits::{FundamentalRecord, QualityRatio};
use serde::{Deserialize, Serialize};

/// Output of [`derive_ratios`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DerivedRatios {
    /// One ratio row per valid record, in input order.
    pub ratios: Vec<QualityRatio>,
    /// Number of records dropped for an inconsistent report kind / month pair.
    pub discarded: usize,
}

/// Computes the four quality ratios of a single record.
///
/// No guard against zero denominators: a zero equity or asset total yields an
/// infinite or NaN ratio, which the grouping stage removes.
#[must_use]
pub fn ratios_for(record: &FundamentalRecord) -> QualityRatio {
    QualityRatio {
        security_id: record.security_id.clone(),
        period_end_date: record.period_end_date,
        report_kind: record.report_kind,
        net_margin: record.net_income / record.revenue,
        operating_margin: record.operating_income / record.revenue,
        return_on_equity: record.net_income / record.total_equity,
        return_on_assets: record.net_income / record.total_assets,
    }
}

/// Derives quality ratios for every record whose report kind matches the
/// calendar month of its period end (3 → Q1, 6 → H1, 9 → Q3, 12 → Annual).
///
/// Mismatched records are expected in registry data (amended or off-cycle
/// filings); they are counted and dropped without error.
#[must_use]
pub fn derive_ratios(records: &[FundamentalRecord]) -> DerivedRatios {
    let ratios: Vec<QualityRatio> = records
        .iter()
        .filter(|r| r.report_kind.matches(r.period_end_date))
        .map(ratios_for)
        .collect();

    let discarded = records.len() - ratios.len();
    if discarded > 0 {
        tracing::debug!(discarded, kept = ratios.len(), "dropped malformed filings");
    }

    DerivedRatios { ratios, discarded }
}
