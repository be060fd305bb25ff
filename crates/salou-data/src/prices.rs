//! Daily return providers.

use crate::columns::{parse_date, parse_number, read_text_table, text_column};
use salou_traits::stats::close_to_close;
use salou_traits::{Date, PriceProvider, Result, SalouError};
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Reads closing prices from one file per security.
///
/// Each file is `<dir>/<security_id>.csv` with a `date` and a `close`
/// column. Returns are close-to-close changes; the first day of a window is
/// measured against the last close before it when the file has one.
#[derive(Debug, Clone)]
pub struct CsvPriceProvider {
    dir: PathBuf,
}

impl CsvPriceProvider {
    /// Provider over the price files in `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File holding the prices of `security_id`.
    pub fn file_for(&self, security_id: &str) -> PathBuf {
        self.dir.join(format!("{security_id}.csv"))
    }
}

impl PriceProvider for CsvPriceProvider {
    fn daily_returns(
        &self,
        security_id: &str,
        start: Date,
        end: Date,
    ) -> impl Future<Output = Result<Vec<f64>>> + Send {
        let path = self.file_for(security_id);
        let security_id = security_id.to_string();
        async move {
            if !path.exists() {
                tracing::debug!(%security_id, path = %path.display(), "no price file");
                return Ok(Vec::new());
            }
            let closes = tokio::task::spawn_blocking(move || read_closes(&path))
                .await
                .map_err(|e| SalouError::PriceLookup {
                    security_id: security_id.clone(),
                    message: e.to_string(),
                })??;
            Ok(close_to_close(&closes, start, end))
        }
    }
}

/// Reads `(date, close)` pairs sorted by date.
fn read_closes(path: &Path) -> Result<Vec<(Date, f64)>> {
    let df = read_text_table(path, b',')?;
    let dates = text_column(&df, "date")?;
    let closes = text_column(&df, "close")?;

    let mut rows = dates
        .into_iter()
        .zip(closes)
        .enumerate()
        .map(|(idx, (date, close))| {
            let date = date.and_then(parse_date);
            let close = close.and_then(parse_number);
            date.zip(close).ok_or_else(|| {
                SalouError::InvalidData(format!("{}: bad price row {}", path.display(), idx + 1))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    rows.sort_by_key(|(date, _)| *date);
    rows.dedup_by_key(|(date, _)| *date);
    Ok(rows)
}

/// Daily returns held in memory, keyed by security.
///
/// Failures and delays can be injected per security to exercise timeout and
/// error paths.
///
/// # Example
///
/// ```rust
/// use salou_data::MemoryPriceProvider;
/// use salou_traits::Date;
///
/// let day = Date::from_ymd_opt(2023, 4, 3).unwrap();
/// let provider = MemoryPriceProvider::new()
///     .with_returns("005930", vec![(day, 0.01)])
///     .with_failure("000660", "connection reset");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryPriceProvider {
    returns: HashMap<String, Vec<(Date, f64)>>,
    failures: HashMap<String, String>,
    delays: HashMap<String, Duration>,
}

impl MemoryPriceProvider {
    /// Empty provider: every lookup returns no data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dated daily returns for `security_id`.
    #[must_use]
    pub fn with_returns(mut self, security_id: &str, returns: Vec<(Date, f64)>) -> Self {
        self.returns.insert(security_id.to_string(), returns);
        self
    }

    /// Make every lookup of `security_id` fail with `message`.
    #[must_use]
    pub fn with_failure(mut self, security_id: &str, message: &str) -> Self {
        self.failures
            .insert(security_id.to_string(), message.to_string());
        self
    }

    /// Delay every lookup of `security_id`.
    #[must_use]
    pub fn with_delay(mut self, security_id: &str, delay: Duration) -> Self {
        self.delays.insert(security_id.to_string(), delay);
        self
    }
}

impl PriceProvider for MemoryPriceProvider {
    fn daily_returns(
        &self,
        security_id: &str,
        start: Date,
        end: Date,
    ) -> impl Future<Output = Result<Vec<f64>>> + Send {
        let delay = self.delays.get(security_id).copied();
        let failure = self.failures.get(security_id).cloned();
        let returns: Vec<f64> = self
            .returns
            .get(security_id)
            .map(|series| {
                series
                    .iter()
                    .filter(|(date, _)| *date >= start && *date <= end)
                    .map(|(_, r)| *r)
                    .collect()
            })
            .unwrap_or_default();
        let security_id = security_id.to_string();

        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            match failure {
                Some(message) => Err(SalouError::PriceLookup {
                    security_id,
                    message,
                }),
                None => Ok(returns),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::fs;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_csv_returns_use_prior_close() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("005930.csv"),
            "date,close\n2023-03-31,100\n2023-04-03,110\n2023-04-04,99\n2023-07-03,120\n",
        )
        .unwrap();

        let provider = CsvPriceProvider::new(dir.path());
        let returns = provider
            .daily_returns("005930", date(2023, 4, 1), date(2023, 6, 30))
            .await
            .unwrap();

        assert_eq!(returns.len(), 2);
        assert_relative_eq!(returns[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(returns[1], -0.1, epsilon = 1e-12);
    }

    #[tokio::test]
    async fn test_csv_unsorted_rows() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("A.csv"),
            "date,close\n2023-04-04,121\n2023-04-03,110\n",
        )
        .unwrap();

        let returns = CsvPriceProvider::new(dir.path())
            .daily_returns("A", date(2023, 4, 1), date(2023, 6, 30))
            .await
            .unwrap();
        assert_eq!(returns.len(), 1);
        assert_relative_eq!(returns[0], 0.1, epsilon = 1e-12);
    }

    #[tokio::test]
    async fn test_csv_repeated_date_counts_once() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("C.csv"),
            "date,close\n2023-04-03,100\n2023-04-03,100\n2023-04-04,110\n",
        )
        .unwrap();

        let returns = CsvPriceProvider::new(dir.path())
            .daily_returns("C", date(2023, 4, 1), date(2023, 6, 30))
            .await
            .unwrap();
        assert_eq!(returns.len(), 1);
        assert_relative_eq!(returns[0], 0.1, epsilon = 1e-12);
    }

    #[tokio::test]
    async fn test_csv_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let returns = CsvPriceProvider::new(dir.path())
            .daily_returns("NOPE", date(2023, 4, 1), date(2023, 6, 30))
            .await
            .unwrap();
        assert!(returns.is_empty());
    }

    #[tokio::test]
    async fn test_csv_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("B.csv"), "date,close\n2023-04-03,abc\n").unwrap();

        let result = CsvPriceProvider::new(dir.path())
            .daily_returns("B", date(2023, 4, 1), date(2023, 6, 30))
            .await;
        assert!(matches!(result, Err(SalouError::InvalidData(_))));
    }

    #[tokio::test]
    async fn test_memory_filters_window() {
        let provider = MemoryPriceProvider::new().with_returns(
            "A",
            vec![
                (date(2023, 3, 31), 0.5),
                (date(2023, 4, 3), 0.01),
                (date(2023, 6, 30), 0.02),
                (date(2023, 7, 3), 0.5),
            ],
        );
        let returns = provider
            .daily_returns("A", date(2023, 4, 1), date(2023, 6, 30))
            .await
            .unwrap();
        assert_eq!(returns, vec![0.01, 0.02]);

        let missing = provider
            .daily_returns("B", date(2023, 4, 1), date(2023, 6, 30))
            .await
            .unwrap();
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn test_memory_failure() {
        let provider = MemoryPriceProvider::new().with_failure("A", "boom");
        let err = provider
            .daily_returns("A", date(2023, 4, 1), date(2023, 6, 30))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("boom"));
    }
}
