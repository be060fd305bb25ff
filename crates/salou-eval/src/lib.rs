//! Quintile backtesting engine for salou.
//!
//! This crate runs the quarterly quality backtest:
//! - Rebalance schedule: one buy/sell window per report date
//! - Quantile grouping: equal-population buckets by a quality ratio
//! - Return aggregation: concurrent per-security price lookups
//! - Performance summary: mean risk-adjusted score per bucket
//!
//! # Example
//!
//! ```rust,ignore
//! use salou_eval::{BacktestConfig, QualityBacktest};
//!
//! let backtest = QualityBacktest::new(BacktestConfig::default(), price_provider)?;
//! let report = backtest.run(&fundamentals_provider, &mut sink).await?;
//! println!("skipped pairs: {}", report.skipped_pairs());
//! ```

pub mod aggregate;
pub mod backtest;
pub mod config;
pub mod quantile;
pub mod schedule;
pub mod state;
pub mod summary;

// Re-export main types
pub use aggregate::{Aggregation, Exclusion, ExclusionReason, ReturnAggregator};
pub use backtest::{BacktestReport, MetricOverview, PairReport, QualityBacktest};
pub use config::BacktestConfig;
pub use quantile::{QuantileGrouper, cross_section, quantile_labels};
pub use schedule::{rebalance_window, report_dates, schedule};
pub use state::PairState;
pub use summary::{risk_adjusted_score, summarize, top_minus_bottom};
