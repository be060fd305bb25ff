//! Quality ratios based on profitability and operational efficiency.
//!
//! Ratios are computed per filing, after discarding filings whose report kind
//! does not match the month their period ends in.

mod deriver;

pub use deriver::{DerivedRatios, derive_ratios, ratios_for};
