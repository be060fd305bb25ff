//! Result sinks.

use polars::prelude::*;
use salou_traits::{Date, QualityMetric, Result, ResultRow, ResultSink, SalouError};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Writes one CSV file per (report date, metric) pair.
///
/// Files are named `<YYYY-MM-DD>_<metric>.csv` and overwritten when a pair
/// is written twice.
#[derive(Debug, Clone)]
pub struct CsvResultSink {
    dir: PathBuf,
}

impl CsvResultSink {
    /// Sink writing into `dir`, created if missing.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File the table of one pair is written to.
    pub fn file_for(&self, report_date: Date, metric: QualityMetric) -> PathBuf {
        self.dir
            .join(format!("{}_{}.csv", report_date.format("%Y-%m-%d"), metric.name()))
    }
}

fn to_frame(rows: &[ResultRow]) -> PolarsResult<DataFrame> {
    let ids: Vec<&str> = rows.iter().map(|r| r.security_id.as_str()).collect();
    let dates: Vec<String> = rows.iter().map(|r| r.report_date.to_string()).collect();
    let groups: Vec<u32> = rows.iter().map(|r| r.group).collect();
    let cumulative: Vec<Option<f64>> = rows.iter().map(|r| r.cumulative_return).collect();
    let std_devs: Vec<Option<f64>> = rows.iter().map(|r| r.return_std_dev).collect();
    let scores: Vec<Option<f64>> = rows.iter().map(|r| r.score).collect();

    df![
        "security_id" => ids,
        "report_date" => dates,
        "group_label" => groups,
        "cumulative_return" => cumulative,
        "return_std_dev" => std_devs,
        "score" => scores,
    ]
}

impl ResultSink for CsvResultSink {
    fn write(
        &mut self,
        report_date: Date,
        metric: QualityMetric,
        rows: &[ResultRow],
    ) -> Result<()> {
        let path = self.file_for(report_date, metric);
        let mut df = to_frame(rows)?;
        let mut file = File::create(&path)
            .map_err(|e| SalouError::Sink(format!("{}: {e}", path.display())))?;
        CsvWriter::new(&mut file).include_header(true).finish(&mut df)?;

        tracing::debug!(path = %path.display(), rows = rows.len(), "result table written");
        Ok(())
    }
}

/// Keeps every written table in memory, in write order.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    tables: Vec<(Date, QualityMetric, Vec<ResultRow>)>,
    fail_with: Option<String>,
}

impl MemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that rejects every write with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            tables: Vec::new(),
            fail_with: Some(message.to_string()),
        }
    }

    /// Written tables in write order.
    pub fn tables(&self) -> &[(Date, QualityMetric, Vec<ResultRow>)] {
        &self.tables
    }

    /// Rows written for one pair, if any.
    pub fn rows(&self, report_date: Date, metric: QualityMetric) -> Option<&[ResultRow]> {
        self.tables
            .iter()
            .find(|(date, m, _)| *date == report_date && *m == metric)
            .map(|(_, _, rows)| rows.as_slice())
    }
}

impl ResultSink for MemorySink {
    fn write(
        &mut self,
        report_date: Date,
        metric: QualityMetric,
        rows: &[ResultRow],
    ) -> Result<()> {
        if let Some(message) = &self.fail_with {
            return Err(SalouError::Sink(message.clone()));
        }
        self.tables.push((report_date, metric, rows.to_vec()));
        Ok(())
    }
}
