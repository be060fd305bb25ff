//! Input helpers for the salou CLI.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use salou::eval::BacktestConfig;
use std::fs;
use std::path::Path;

/// Parse a date string in YYYY-MM-DD format.
pub(crate) fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{date_str}', expected YYYY-MM-DD"))
}

/// Reads a JSON backtest configuration, or the defaults when `path` is `None`.
pub(crate) fn load_config(path: Option<&Path>) -> Result<BacktestConfig> {
    let Some(path) = path else {
        return Ok(BacktestConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
}
