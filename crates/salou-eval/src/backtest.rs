//! Quality backtest runner.
//!
//! Drives the outer loop over report dates (chronological) and metrics
//! (configured order). Each (date, metric) pair is grouped, aggregated,
//! summarized and persisted on its own; a pair with too few securities is
//! skipped and a failing security is excluded, neither stops the run.

use crate::aggregate::{Exclusion, ReturnAggregator};
use crate::config::BacktestConfig;
use crate::quantile::{QuantileGrouper, cross_section};
use crate::schedule::{report_dates, schedule};
use crate::state::PairState;
use crate::summary::{summarize, top_minus_bottom};
use salou_signals::derive_ratios;
use salou_traits::stats::finite_mean;
use salou_traits::{
    Date, FundamentalRecord, FundamentalsProvider, GroupSummary, PriceProvider, QualityMetric,
    QualityRatio, RebalanceWindow, Result, ResultRow, ResultSink, SecurityOutcome,
};
use serde::{Deserialize, Serialize};

/// Outcome of one (report date, metric) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairReport {
    /// Holding period of the pair.
    pub window: RebalanceWindow,
    /// Ranking metric.
    pub metric: QualityMetric,
    /// Final state, `Persisted` or `Skipped`.
    pub state: PairState,
    /// Number of securities that received a group.
    pub population: usize,
    /// One summary per group, empty when skipped.
    pub groups: Vec<GroupSummary>,
    /// Securities left out of the group means.
    pub exclusions: Vec<Exclusion>,
    /// Why the pair was skipped.
    pub skip_reason: Option<String>,
}

impl PairReport {
    /// Report date of the pair.
    pub const fn report_date(&self) -> Date {
        self.window.report_date
    }

    /// Whether the pair was skipped.
    pub fn is_skipped(&self) -> bool {
        self.state == PairState::Skipped
    }

    /// Top group mean minus bottom group mean.
    pub fn spread(&self) -> Option<f64> {
        top_minus_bottom(&self.groups)
    }
}

/// Per-metric view across all report dates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricOverview {
    /// Metric.
    pub metric: QualityMetric,
    /// Mean of the defined group means across dates, index `g - 1` for group `g`.
    pub group_means: Vec<Option<f64>>,
    /// Mean top-minus-bottom spread across dates.
    pub mean_spread: Option<f64>,
    /// Number of pairs that were not skipped.
    pub pairs: usize,
}

/// Full result of a backtest run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Pair reports in processing order.
    pub pairs: Vec<PairReport>,
    /// Filings dropped for an inconsistent report kind / month pair.
    pub discarded_records: usize,
}

impl BacktestReport {
    /// Number of pairs skipped for insufficient population.
    pub fn skipped_pairs(&self) -> usize {
        self.pairs.iter().filter(|p| p.is_skipped()).count()
    }

    /// Number of pairs that reached the sink.
    pub fn completed_pairs(&self) -> usize {
        self.pairs
            .iter()
            .filter(|p| p.state == PairState::Persisted)
            .count()
    }

    /// Total (security, pair) exclusions across the run.
    pub fn excluded_securities(&self) -> usize {
        self.pairs.iter().map(|p| p.exclusions.len()).sum()
    }

    /// Averages group means per metric over every completed pair.
    pub fn metric_overview(&self) -> Vec<MetricOverview> {
        let mut metrics: Vec<QualityMetric> = Vec::new();
        for pair in &self.pairs {
            if !metrics.contains(&pair.metric) {
                metrics.push(pair.metric);
            }
        }

        metrics
            .into_iter()
            .map(|metric| {
                let completed: Vec<&PairReport> = self
                    .pairs
                    .iter()
                    .filter(|p| p.metric == metric && !p.is_skipped())
                    .collect();
                let n_groups = completed.iter().map(|p| p.groups.len()).max().unwrap_or(0);

                let group_means = (0..n_groups)
                    .map(|idx| {
                        let means: Vec<f64> = completed
                            .iter()
                            .filter_map(|p| p.groups.get(idx).and_then(|g| g.mean_score))
                            .collect();
                        finite_mean(&means)
                    })
                    .collect();
                let spreads: Vec<f64> = completed.iter().filter_map(|p| p.spread()).collect();

                MetricOverview {
                    metric,
                    group_means,
                    mean_spread: finite_mean(&spreads),
                    pairs: completed.len(),
                }
            })
            .collect()
    }
}

/// Quarterly quality-factor backtest.
///
/// # Example
///
/// ```rust,ignore
/// use salou_eval::{BacktestConfig, QualityBacktest};
///
/// let backtest = QualityBacktest::new(BacktestConfig::default(), prices)?;
/// let report = backtest.run(&fundamentals, &mut sink).await?;
/// ```
#[derive(Debug)]
pub struct QualityBacktest<P> {
    config: BacktestConfig,
    grouper: QuantileGrouper,
    aggregator: ReturnAggregator<P>,
}

impl<P: PriceProvider> QualityBacktest<P> {
    /// Create a backtest from a configuration and a price provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn new(config: BacktestConfig, provider: P) -> Result<Self> {
        config.validate()?;
        let aggregator =
            ReturnAggregator::new(provider, config.concurrency, config.price_timeout());
        Ok(Self {
            grouper: QuantileGrouper::new(config.n_groups),
            config,
            aggregator,
        })
    }

    /// The configuration in use.
    pub const fn config(&self) -> &BacktestConfig {
        &self.config
    }

    fn windows_for(&self, ratios: &[QualityRatio]) -> Result<Vec<RebalanceWindow>> {
        let dates = report_dates(ratios, self.config.start, self.config.end);
        schedule(&dates, self.config.buffer_months)
    }

    /// Runs the backtest on the provider's fundamentals.
    ///
    /// # Errors
    ///
    /// Fails if the fundamentals provider fails, if the sink fails, or, in
    /// strict mode, if a pair has too few securities.
    pub async fn run<F, S>(&self, fundamentals: &F, sink: &mut S) -> Result<BacktestReport>
    where
        F: FundamentalsProvider + ?Sized,
        S: ResultSink + ?Sized,
    {
        let records = fundamentals.fundamentals()?;
        tracing::info!(records = records.len(), "fundamentals loaded");
        self.run_records(&records, sink).await
    }

    /// Runs the backtest on an in-memory fundamentals table.
    ///
    /// # Errors
    ///
    /// Same as [`Self::run`], minus provider failures.
    pub async fn run_records<S>(
        &self,
        records: &[FundamentalRecord],
        sink: &mut S,
    ) -> Result<BacktestReport>
    where
        S: ResultSink + ?Sized,
    {
        let derived = derive_ratios(records);
        let windows = self.windows_for(&derived.ratios)?;
        tracing::info!(
            ratios = derived.ratios.len(),
            discarded = derived.discarded,
            windows = windows.len(),
            "schedule built"
        );

        let mut pairs = Vec::with_capacity(windows.len() * self.config.metrics.len());
        for window in &windows {
            let cross = cross_section(&derived.ratios, window.report_date);
            for &metric in &self.config.metrics {
                pairs.push(self.run_pair(window, metric, &cross, sink).await?);
            }
        }

        let report = BacktestReport {
            pairs,
            discarded_records: derived.discarded,
        };
        tracing::info!(
            completed = report.completed_pairs(),
            skipped = report.skipped_pairs(),
            excluded = report.excluded_securities(),
            "backtest finished"
        );
        Ok(report)
    }

    async fn run_pair<S>(
        &self,
        window: &RebalanceWindow,
        metric: QualityMetric,
        cross: &[&QualityRatio],
        sink: &mut S,
    ) -> Result<PairReport>
    where
        S: ResultSink + ?Sized,
    {
        let report_date = window.report_date;
        tracing::info!(%report_date, %metric, securities = cross.len(), "backtesting pair");

        let grouping = self.grouper.assign(cross, report_date, metric);
        let state = PairState::Scheduled.advance(PairState::Grouped)?;

        let assignments = match grouping {
            Ok(assignments) => assignments,
            Err(e) if e.is_pair_local() && !self.config.strict => {
                tracing::warn!(%report_date, %metric, error = %e, "pair skipped");
                return Ok(PairReport {
                    window: *window,
                    metric,
                    state: state.advance(PairState::Skipped)?,
                    population: 0,
                    groups: Vec::new(),
                    exclusions: Vec::new(),
                    skip_reason: Some(e.to_string()),
                });
            }
            Err(e) => return Err(e),
        };

        let aggregation = self.aggregator.aggregate(window, &assignments).await;
        let state = state.advance(PairState::Aggregated)?;

        let outcomes: Vec<SecurityOutcome> = aggregation.present().cloned().collect();
        let groups = summarize(report_date, metric, self.config.n_groups, &outcomes);
        let state = state.advance(PairState::Summarized)?;

        let rows: Vec<ResultRow> = assignments
            .iter()
            .zip(&aggregation.outcomes)
            .map(|(assignment, outcome)| ResultRow::new(assignment, outcome.as_ref()))
            .collect();
        sink.write(report_date, metric, &rows)?;
        let state = state.advance(PairState::Persisted)?;

        Ok(PairReport {
            window: *window,
            metric,
            state,
            population: assignments.len(),
            groups,
            exclusions: aggregation.exclusions,
            skip_reason: None,
        })
    }
}
