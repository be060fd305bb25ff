#![doc(issue_tracker_base_url = "https://github.com/factordynamics/salou/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and provider traits for the salou quality backtester.
//!
//! This crate holds the value records that flow through a backtest
//! (fundamental records, quality ratios, rebalance windows, group assignments,
//! security outcomes and group summaries), the error type shared by every
//! salou crate, and the three seams to the outside world: the
//! [`FundamentalsProvider`], the [`PriceProvider`] and the [`ResultSink`].

/// The version of the salou-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod provider;
pub mod stats;
pub mod types;

// Re-exports
pub use error::{Result, SalouError};
pub use provider::{FundamentalsProvider, PriceProvider, ResultSink};
pub use types::{
    Date, FundamentalRecord, GroupAssignment, GroupSummary, QualityMetric, QualityRatio,
    RebalanceWindow, ReportKind, ResultRow, SecurityId, SecurityOutcome,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }
}
