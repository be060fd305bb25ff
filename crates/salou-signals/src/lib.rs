//! Quality signals for the salou backtester.
//!
//! This crate turns cleaned financial statements into the quality ratios used
//! to rank a cross-section:
//! - Net margin: net income relative to revenue
//! - Operating margin: operating income relative to revenue
//! - Return on equity (ROE): net income relative to total equity
//! - Return on assets (ROA): net income relative to total assets
//!
//! # Example
//!
//! ```ignore
//! use salou_signals::quality::derive_ratios;
//!
//! let derived = derive_ratios(&records);
//! println!("{} ratios, {} discarded", derived.ratios.len(), derived.discarded);
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod quality;
pub mod registry;

// Re-export key types
pub use quality::{DerivedRatios, derive_ratios};
pub use registry::{MetricInfo, available_metrics};
