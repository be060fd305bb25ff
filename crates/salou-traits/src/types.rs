//! Common types used throughout salou.
//!
//! Every record here is a plain value: built once, never mutated afterwards.

use crate::error::{Result, SalouError};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// A listed-company identifier, e.g. the six digit exchange code "005930".
pub type SecurityId = String;

/// Filing category of a financial statement.
///
/// Each kind belongs to exactly one fiscal calendar month for December
/// year-end companies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReportKind {
    /// First quarter report, period ending in March.
    Q1,
    /// Half-year report, period ending in June.
    H1,
    /// Third quarter report, period ending in September.
    Q3,
    /// Annual business report, period ending in December.
    Annual,
}

impl ReportKind {
    /// All report kinds in fiscal order.
    pub const ALL: [Self; 4] = [Self::Q1, Self::H1, Self::Q3, Self::Annual];

    /// Calendar month in which the reporting period of this kind ends.
    #[must_use]
    pub const fn closing_month(&self) -> u32 {
        match self {
            Self::Q1 => 3,
            Self::H1 => 6,
            Self::Q3 => 9,
            Self::Annual => 12,
        }
    }

    /// Registry filing code for this kind.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Q1 => "11013",
            Self::H1 => "11012",
            Self::Q3 => "11014",
            Self::Annual => "11011",
        }
    }

    /// Looks up a kind from its registry filing code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    /// Whether a period ending on `date` is consistent with this kind.
    #[must_use]
    pub fn matches(&self, date: Date) -> bool {
        date.month() == self.closing_month()
    }

    /// Short label used in tables and files.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Q1 => "Q1",
            Self::H1 => "H1",
            Self::Q3 => "Q3",
            Self::Annual => "Annual",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = SalouError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(kind) = Self::from_code(s) {
            return Ok(kind);
        }
        match s.to_ascii_lowercase().as_str() {
            "q1" => Ok(Self::Q1),
            "h1" | "half" => Ok(Self::H1),
            "q3" => Ok(Self::Q3),
            "annual" | "fy" => Ok(Self::Annual),
            _ => Err(SalouError::InvalidData(format!("unknown report kind '{s}'"))),
        }
    }
}

/// Quality metric used to rank the cross-section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityMetric {
    /// Net income / revenue.
    NetMargin,
    /// Operating income / revenue.
    OperatingMargin,
    /// Net income / total equity.
    ReturnOnEquity,
    /// Net income / total assets.
    ReturnOnAssets,
}

impl QualityMetric {
    /// Every metric, in the order a backtest visits them by default.
    pub const ALL: [Self; 4] = [
        Self::NetMargin,
        Self::OperatingMargin,
        Self::ReturnOnEquity,
        Self::ReturnOnAssets,
    ];

    /// Stable snake_case name, also used in result file names.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NetMargin => "net_margin",
            Self::OperatingMargin => "operating_margin",
            Self::ReturnOnEquity => "return_on_equity",
            Self::ReturnOnAssets => "return_on_assets",
        }
    }
}

impl fmt::Display for QualityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QualityMetric {
    type Err = SalouError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "net_margin" => Ok(Self::NetMargin),
            "operating_margin" => Ok(Self::OperatingMargin),
            "return_on_equity" | "roe" => Ok(Self::ReturnOnEquity),
            "return_on_assets" | "roa" => Ok(Self::ReturnOnAssets),
            other => Err(SalouError::UnknownMetric(other.to_string())),
        }
    }
}

/// One financial statement filing, already cleaned by the provider.
///
/// Providers guarantee `revenue != 0` and uniqueness per
/// (`security_id`, `period_end_date`, `report_kind`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalRecord {
    /// Issuer.
    pub security_id: SecurityId,
    /// Last day of the reporting period.
    pub period_end_date: Date,
    /// Filing category.
    pub report_kind: ReportKind,
    /// Revenue.
    pub revenue: f64,
    /// Operating income.
    pub operating_income: f64,
    /// Net income.
    pub net_income: f64,
    /// Total equity at period end.
    pub total_equity: f64,
    /// Total assets at period end.
    pub total_assets: f64,
}

/// Quality ratios derived from one [`FundamentalRecord`].
///
/// Ratios may be non-finite (e.g. zero equity); consumers filter them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityRatio {
    /// Issuer.
    pub security_id: SecurityId,
    /// Report date the ratios are known at.
    pub period_end_date: Date,
    /// Filing category the ratios come from.
    pub report_kind: ReportKind,
    /// Net income / revenue.
    pub net_margin: f64,
    /// Operating income / revenue.
    pub operating_margin: f64,
    /// Net income / total equity.
    pub return_on_equity: f64,
    /// Net income / total assets.
    pub return_on_assets: f64,
}

impl QualityRatio {
    /// Value of the given metric.
    #[must_use]
    pub const fn value(&self, metric: QualityMetric) -> f64 {
        match metric {
            QualityMetric::NetMargin => self.net_margin,
            QualityMetric::OperatingMargin => self.operating_margin,
            QualityMetric::ReturnOnEquity => self.return_on_equity,
            QualityMetric::ReturnOnAssets => self.return_on_assets,
        }
    }
}

/// Holding period for one report date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalanceWindow {
    /// Report date the window is derived from.
    pub report_date: Date,
    /// First day of the holding period.
    pub buy_date: Date,
    /// Last day of the holding period.
    pub sell_date: Date,
}

/// Quantile bucket of one security for one (date, metric) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupAssignment {
    /// Issuer.
    pub security_id: SecurityId,
    /// Report date of the cross-section.
    pub report_date: Date,
    /// Ranking metric.
    pub metric: QualityMetric,
    /// Bucket label in `1..=n_groups`; the highest label holds the best quality.
    pub group: u32,
}

/// Forward-period performance of one grouped security.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityOutcome {
    /// Issuer.
    pub security_id: SecurityId,
    /// Report date of the cross-section.
    pub report_date: Date,
    /// Ranking metric.
    pub metric: QualityMetric,
    /// Bucket label.
    pub group: u32,
    /// Sum of daily returns over the window.
    pub cumulative_return: f64,
    /// Sample standard deviation of daily returns over the window.
    pub return_std_dev: f64,
    /// `cumulative_return / return_std_dev`, `None` when undefined.
    pub score: Option<f64>,
}

/// Mean score of one bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Report date of the cross-section.
    pub report_date: Date,
    /// Ranking metric.
    pub metric: QualityMetric,
    /// Bucket label.
    pub group: u32,
    /// Arithmetic mean of defined scores, `None` when no member has one.
    pub mean_score: Option<f64>,
    /// Number of members whose score entered the mean.
    pub contributors: usize,
}

/// One line of the per-pair result table handed to a [`crate::ResultSink`].
///
/// Every grouped security gets a row, including the ones whose outcome is
/// absent, so the table keeps the cross-section's ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    /// Issuer.
    pub security_id: SecurityId,
    /// Report date of the cross-section.
    pub report_date: Date,
    /// Bucket label.
    pub group: u32,
    /// Sum of daily returns, absent when no series was available.
    pub cumulative_return: Option<f64>,
    /// Sample standard deviation, absent when no series was available.
    pub return_std_dev: Option<f64>,
    /// Risk-adjusted score, absent when undefined.
    pub score: Option<f64>,
}

impl ResultRow {
    /// Builds a row from an assignment and its outcome, if any.
    #[must_use]
    pub fn new(assignment: &GroupAssignment, outcome: Option<&SecurityOutcome>) -> Self {
        Self {
            security_id: assignment.security_id.clone(),
            report_date: assignment.report_date,
            group: assignment.group,
            cumulative_return: outcome.map(|o| o.cumulative_return),
            return_std_dev: outcome.map(|o| o.return_std_dev),
            score: outcome.and_then(|o| o.score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_report_kind_codes() {
        assert_eq!(ReportKind::from_code("11013"), Some(ReportKind::Q1));
        assert_eq!(ReportKind::from_code("11012"), Some(ReportKind::H1));
        assert_eq!(ReportKind::from_code("11014"), Some(ReportKind::Q3));
        assert_eq!(ReportKind::from_code("11011"), Some(ReportKind::Annual));
        assert_eq!(ReportKind::from_code("99999"), None);
    }

    #[test]
    fn test_report_kind_parse() {
        assert_eq!("11014".parse::<ReportKind>().unwrap(), ReportKind::Q3);
        assert_eq!("annual".parse::<ReportKind>().unwrap(), ReportKind::Annual);
        assert_eq!("H1".parse::<ReportKind>().unwrap(), ReportKind::H1);
        assert!("Q2".parse::<ReportKind>().is_err());
    }

    #[test]
    fn test_report_kind_matches() {
        assert!(ReportKind::Q1.matches(date(2023, 3, 31)));
        assert!(ReportKind::Annual.matches(date(2022, 12, 31)));
        assert!(!ReportKind::Annual.matches(date(2023, 3, 31)));
        assert!(!ReportKind::H1.matches(date(2023, 9, 30)));
    }

    #[test]
    fn test_metric_parse_and_name() {
        for metric in QualityMetric::ALL {
            assert_eq!(metric.name().parse::<QualityMetric>().unwrap(), metric);
        }
        assert_eq!(
            "ROE".parse::<QualityMetric>().unwrap(),
            QualityMetric::ReturnOnEquity
        );
        assert_eq!(
            "operating-margin".parse::<QualityMetric>().unwrap(),
            QualityMetric::OperatingMargin
        );
        assert!(matches!(
            "gross_margin".parse::<QualityMetric>(),
            Err(SalouError::UnknownMetric(_))
        ));
    }

    #[test]
    fn test_quality_ratio_value() {
        let ratio = QualityRatio {
            security_id: "005930".to_string(),
            period_end_date: date(2023, 3, 31),
            report_kind: ReportKind::Q1,
            net_margin: 0.1,
            operating_margin: 0.2,
            return_on_equity: 0.3,
            return_on_assets: 0.4,
        };
        assert_eq!(ratio.value(QualityMetric::NetMargin), 0.1);
        assert_eq!(ratio.value(QualityMetric::OperatingMargin), 0.2);
        assert_eq!(ratio.value(QualityMetric::ReturnOnEquity), 0.3);
        assert_eq!(ratio.value(QualityMetric::ReturnOnAssets), 0.4);
    }

    #[test]
    fn test_result_row_without_outcome() {
        let assignment = GroupAssignment {
            security_id: "000660".to_string(),
            report_date: date(2023, 6, 30),
            metric: QualityMetric::NetMargin,
            group: 3,
        };
        let row = ResultRow::new(&assignment, None);
        assert_eq!(row.group, 3);
        assert!(row.cumulative_return.is_none());
        assert!(row.return_std_dev.is_none());
        assert!(row.score.is_none());
    }
}
