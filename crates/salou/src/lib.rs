#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/salou/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # salou
//!
//! salou is an umbrella crate that re-exports all salou sub-crates for
//! convenience.
//!
//! ## Quick Start
//!
//! ```ignore
//! use salou::data::{CsvFundamentalsProvider, CsvPriceProvider, CsvResultSink};
//! use salou::eval::{BacktestConfig, QualityBacktest};
//!
//! # async fn example() -> salou::Result<()> {
//! let fundamentals = CsvFundamentalsProvider::new("data/fundamentals.tsv");
//! let prices = CsvPriceProvider::new("data/prices");
//! let mut sink = CsvResultSink::new("results")?;
//!
//! let backtest = QualityBacktest::new(BacktestConfig::default(), prices)?;
//! let report = backtest.run(&fundamentals, &mut sink).await?;
//! println!("{} pairs, {} skipped", report.pairs.len(), report.skipped_pairs());
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - Records, errors and the provider/sink seams
//! - [`signals`] - Quality ratio derivation
//! - [`eval`] - Schedule, grouping, aggregation and summary
//! - [`data`] - File and in-memory providers and sinks
//! - [`fmp`] - Financial Modeling Prep price provider

/// Version information for the salou crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Core Types
// ============================================================================

/// Records, errors and provider traits.
pub mod traits {
    pub use salou_traits::*;
}

pub use salou_traits::{FundamentalsProvider, PriceProvider, ResultSink};
pub use salou_traits::{Result, SalouError};
pub use salou_traits::{Date, QualityMetric, ReportKind};

// ============================================================================
// Pipeline
// ============================================================================

/// Quality ratio derivation.
pub mod signals {
    pub use salou_signals::*;
}

/// Backtest engine.
///
/// ## Score
///
/// Each grouped security is scored over its holding window:
///
/// ```text
/// score = sum(daily returns) / std(daily returns, ddof = 1)
/// ```
///
/// Securities with a zero or undefined volatility have no score and do not
/// enter their group's mean.
pub mod eval {
    pub use salou_eval::*;
}

// ============================================================================
// Data Providers
// ============================================================================

/// File-backed and in-memory providers and sinks.
pub mod data {
    pub use salou_data::*;
}

/// Financial Modeling Prep (FMP) price provider.
///
/// Requires the `FMP_API_KEY` environment variable or a `.env` file.
pub mod fmp {
    pub use salou_fmp::*;
}

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```ignore
/// use salou::prelude::*;
/// ```
pub mod prelude {
    pub use crate::eval::{BacktestConfig, BacktestReport, QualityBacktest};
    pub use crate::traits::*;
}
