//! Backtest configuration.

use salou_traits::{Date, QualityMetric, Result, SalouError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Backtesting configuration.
///
/// Every field has a default, so a partial JSON document deserializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Number of quantile buckets
    pub n_groups: usize,
    /// Months between the report date and the start of the holding period.
    /// Zero assumes ratios are known on the report date itself.
    pub buffer_months: u32,
    /// Metrics to rank by, in the order they are visited per date
    pub metrics: Vec<QualityMetric>,
    /// Maximum concurrent price lookups per pair
    pub concurrency: usize,
    /// Per-security price lookup timeout in seconds
    pub price_timeout_secs: u64,
    /// First report date to include
    pub start: Option<Date>,
    /// Last report date to include
    pub end: Option<Date>,
    /// Abort the run instead of skipping a pair with too few securities
    pub strict: bool,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            n_groups: 5,
            buffer_months: 0,
            metrics: QualityMetric::ALL.to_vec(),
            concurrency: 8,
            price_timeout_secs: 30,
            start: None,
            end: None,
            strict: false,
        }
    }
}

impl BacktestConfig {
    /// Price lookup timeout as a [`Duration`].
    #[must_use]
    pub const fn price_timeout(&self) -> Duration {
        Duration::from_secs(self.price_timeout_secs)
    }

    /// Checks the configuration for values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`SalouError::InvalidData`] describing the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.n_groups == 0 {
            return Err(SalouError::InvalidData("n_groups must be at least 1".to_string()));
        }
        if self.concurrency == 0 {
            return Err(SalouError::InvalidData("concurrency must be at least 1".to_string()));
        }
        if self.price_timeout_secs == 0 {
            return Err(SalouError::InvalidData(
                "price_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.metrics.is_empty() {
            return Err(SalouError::InvalidData("no metrics selected".to_string()));
        }
        if let (Some(start), Some(end)) = (self.start, self.end)
            && start > end
        {
            return Err(SalouError::InvalidDate(format!(
                "start {start} is after end {end}"
            )));
        }
        Ok(())
    }
}
