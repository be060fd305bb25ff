//! Forward-return aggregation.
//!
//! Price lookups for one pair run concurrently, at most `concurrency` at a
//! time, each bounded by a timeout. Results come back in the order of the
//! assignments regardless of which lookup finishes first.

use crate::summary::risk_adjusted_score;
use futures::stream::{self, StreamExt};
use salou_traits::stats::series_stats;
use salou_traits::{
    Date, GroupAssignment, PriceProvider, QualityMetric, RebalanceWindow, SecurityId,
    SecurityOutcome,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Why a security did not contribute a score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum ExclusionReason {
    /// The provider returned no observations for the window.
    EmptySeries,
    /// The lookup did not finish within the timeout.
    Timeout,
    /// The provider failed.
    LookupFailed(String),
    /// Returns were available but the volatility was zero or not finite.
    UndefinedScore,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySeries => f.write_str("empty return series"),
            Self::Timeout => f.write_str("price lookup timed out"),
            Self::LookupFailed(msg) => write!(f, "price lookup failed: {msg}"),
            Self::UndefinedScore => f.write_str("undefined score"),
        }
    }
}

/// A security left out of a pair's summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusion {
    /// Excluded security.
    pub security_id: SecurityId,
    /// Report date of the pair.
    pub report_date: Date,
    /// Metric of the pair.
    pub metric: QualityMetric,
    /// Cause.
    pub reason: ExclusionReason,
}

/// Result of aggregating one pair.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    /// One slot per assignment, same order; `None` when no series was available.
    pub outcomes: Vec<Option<SecurityOutcome>>,
    /// Securities that will not enter the group means.
    pub exclusions: Vec<Exclusion>,
}

impl Aggregation {
    /// Outcomes that exist, in assignment order.
    pub fn present(&self) -> impl Iterator<Item = &SecurityOutcome> {
        self.outcomes.iter().flatten()
    }
}

/// Fetches and reduces forward returns for grouped securities.
#[derive(Debug)]
pub struct ReturnAggregator<P> {
    provider: P,
    concurrency: usize,
    timeout: Duration,
}

impl<P: PriceProvider> ReturnAggregator<P> {
    /// Create an aggregator over `provider`.
    ///
    /// `concurrency` is clamped to at least one.
    pub fn new(provider: P, concurrency: usize, timeout: Duration) -> Self {
        Self {
            provider,
            concurrency: concurrency.max(1),
            timeout,
        }
    }

    /// The underlying price provider.
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Looks up and reduces every assignment over `window`.
    ///
    /// Never fails as a whole: a failing, slow or empty lookup only excludes
    /// its own security.
    pub async fn aggregate(
        &self,
        window: &RebalanceWindow,
        assignments: &[GroupAssignment],
    ) -> Aggregation {
        let lookups: Vec<Result<SecurityOutcome, ExclusionReason>> = stream::iter(assignments)
            .map(|assignment| self.lookup(window, assignment))
            .buffered(self.concurrency)
            .collect()
            .await;

        assignments.iter().zip(lookups).fold(
            Aggregation::default(),
            |mut acc, (assignment, lookup)| {
                let (outcome, reason) = match lookup {
                    Ok(outcome) if outcome.score.is_none() => {
                        (Some(outcome), Some(ExclusionReason::UndefinedScore))
                    }
                    Ok(outcome) => (Some(outcome), None),
                    Err(reason) => (None, Some(reason)),
                };

                if let Some(reason) = reason {
                    tracing::warn!(
                        security_id = %assignment.security_id,
                        report_date = %assignment.report_date,
                        metric = %assignment.metric,
                        %reason,
                        "security excluded"
                    );
                    acc.exclusions.push(Exclusion {
                        security_id: assignment.security_id.clone(),
                        report_date: assignment.report_date,
                        metric: assignment.metric,
                        reason,
                    });
                }
                acc.outcomes.push(outcome);
                acc
            },
        )
    }

    async fn lookup(
        &self,
        window: &RebalanceWindow,
        assignment: &GroupAssignment,
    ) -> Result<SecurityOutcome, ExclusionReason> {
        let fetch =
            self.provider
                .daily_returns(&assignment.security_id, window.buy_date, window.sell_date);

        let returns = match tokio::time::timeout(self.timeout, fetch).await {
            Ok(Ok(returns)) => returns,
            Ok(Err(e)) => return Err(ExclusionReason::LookupFailed(e.to_string())),
            Err(_) => return Err(ExclusionReason::Timeout),
        };

        let stats = series_stats(&returns).ok_or(ExclusionReason::EmptySeries)?;
        tracing::debug!(
            security_id = %assignment.security_id,
            days = stats.n,
            cumulative_return = stats.sum,
            "returns aggregated"
        );

        Ok(SecurityOutcome {
            security_id: assignment.security_id.clone(),
            report_date: assignment.report_date,
            metric: assignment.metric,
            group: assignment.group,
            cumulative_return: stats.sum,
            return_std_dev: stats.std,
            score: risk_adjusted_score(stats.sum, stats.std),
        })
    }
}
