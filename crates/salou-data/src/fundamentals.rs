//! Fundamentals providers.
//!
//! The file format is the statement table produced by the registry
//! collector: one row per (security, period end, report code) with the five
//! statement items the ratios need.

use crate::columns::{parse_date, parse_number, read_text_table, text_column};
use polars::prelude::StringChunked;
use salou_traits::{FundamentalRecord, FundamentalsProvider, ReportKind, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const SECURITY_ID: &str = "security_id";
const PERIOD_END_DATE: &str = "period_end_date";
const REPORT_CODE: &str = "report_code";
const REVENUE: &str = "revenue";
const OPERATING_INCOME: &str = "operating_income";
const NET_INCOME: &str = "net_income";
const TOTAL_EQUITY: &str = "total_equity";
const TOTAL_ASSETS: &str = "total_assets";

/// Reads fundamentals from a delimited text file.
///
/// Rows with an unparseable cell, an unknown report code or a zero revenue
/// are dropped. Duplicate (security, period end, report kind) rows keep the
/// first occurrence.
#[derive(Debug, Clone)]
pub struct CsvFundamentalsProvider {
    path: PathBuf,
    separator: u8,
}

impl CsvFundamentalsProvider {
    /// Tab-separated file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            separator: b'\t',
        }
    }

    /// Use a different column separator.
    #[must_use]
    pub const fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FundamentalsProvider for CsvFundamentalsProvider {
    fn fundamentals(&self) -> Result<Vec<FundamentalRecord>> {
        let df = read_text_table(&self.path, self.separator)?;

        let ids = text_column(&df, SECURITY_ID)?;
        let dates = text_column(&df, PERIOD_END_DATE)?;
        let codes = text_column(&df, REPORT_CODE)?;
        let revenue = text_column(&df, REVENUE)?;
        let operating_income = text_column(&df, OPERATING_INCOME)?;
        let net_income = text_column(&df, NET_INCOME)?;
        let total_equity = text_column(&df, TOTAL_EQUITY)?;
        let total_assets = text_column(&df, TOTAL_ASSETS)?;

        let number = |col: &StringChunked, idx: usize| col.get(idx).and_then(parse_number);
        let parse_row = |idx: usize| {
            Some(FundamentalRecord {
                security_id: ids.get(idx)?.trim().to_string(),
                period_end_date: dates.get(idx).and_then(parse_date)?,
                report_kind: codes.get(idx)?.parse::<ReportKind>().ok()?,
                revenue: number(revenue, idx)?,
                operating_income: number(operating_income, idx)?,
                net_income: number(net_income, idx)?,
                total_equity: number(total_equity, idx)?,
                total_assets: number(total_assets, idx)?,
            })
        };

        let mut rows = Vec::with_capacity(df.height());
        let mut malformed = 0_usize;
        for idx in 0..df.height() {
            match parse_row(idx) {
                Some(record) if !record.security_id.is_empty() => rows.push(record),
                _ => malformed += 1,
            }
        }

        let parsed = rows.len();
        let records = clean(rows);
        tracing::info!(
            path = %self.path.display(),
            rows = df.height(),
            malformed,
            dropped = parsed - records.len(),
            records = records.len(),
            "fundamentals read"
        );
        Ok(records)
    }
}

/// Drops rows with a non-finite item, zero-revenue rows and duplicate keys,
/// keeping the first occurrence.
fn clean(rows: Vec<FundamentalRecord>) -> Vec<FundamentalRecord> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|r| {
            [
                r.revenue,
                r.operating_income,
                r.net_income,
                r.total_equity,
                r.total_assets,
            ]
            .iter()
            .all(|v| v.is_finite())
        })
        .filter(|r| r.revenue != 0.0)
        .filter(|r| seen.insert((r.security_id.clone(), r.period_end_date, r.report_kind)))
        .collect()
}

/// Fundamentals held in memory.
///
/// Applies the same cleaning as the file provider on construction, so tests
/// can feed raw rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryFundamentals {
    records: Vec<FundamentalRecord>,
}

impl MemoryFundamentals {
    /// Wraps `records` after cleaning them.
    pub fn new(records: Vec<FundamentalRecord>) -> Self {
        Self {
            records: clean(records),
        }
    }

    /// Number of records after cleaning.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record survived cleaning.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FundamentalsProvider for MemoryFundamentals {
    fn fundamentals(&self) -> Result<Vec<FundamentalRecord>> {
        Ok(self.records.clone())
    }
}
