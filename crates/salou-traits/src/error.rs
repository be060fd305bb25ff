//! Error types for the salou backtester.
//!
//! Only a handful of these ever stop a run. Most of them describe a single
//! (date, metric) pair or a single security and are caught by the runner,
//! which records them and moves on.

use crate::types::{Date, QualityMetric, SecurityId};
use thiserror::Error;

/// The main error type for salou operations.
#[derive(Debug, Error)]
pub enum SalouError {
    /// Fewer finite ratio values than groups for a (date, metric) pair.
    #[error(
        "Insufficient population for {metric} on {report_date}: need {required}, got {available}"
    )]
    InsufficientPopulation {
        /// Report date of the cross-section.
        report_date: Date,
        /// Metric used for ranking.
        metric: QualityMetric,
        /// Number of groups requested.
        required: usize,
        /// Number of securities with a finite ratio.
        available: usize,
    },

    /// Transport or data failure while fetching one security's returns.
    #[error("Price lookup failed for {security_id}: {message}")]
    PriceLookup {
        /// Security whose lookup failed.
        security_id: SecurityId,
        /// Provider supplied description.
        message: String,
    },

    /// Error due to invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error when a required column is missing from an input table.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Error when a date is out of range or cannot be represented.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Error when a metric name is not recognised.
    #[error("Unknown quality metric: {0}")]
    UnknownMetric(String),

    /// Error raised by a result sink.
    #[error("Result sink error: {0}")]
    Sink(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

impl SalouError {
    /// Returns true when the error only concerns a single (date, metric) pair.
    pub const fn is_pair_local(&self) -> bool {
        matches!(self, Self::InsufficientPopulation { .. })
    }
}

impl From<String> for SalouError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for SalouError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for salou operations.
pub type Result<T> = std::result::Result<T, SalouError>;
