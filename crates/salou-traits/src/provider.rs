//! Provider and sink traits.
//!
//! The backtest core never talks to a registry, a market data vendor or a
//! file system directly. It goes through these three seams, which keeps it
//! runnable on fixture data.

use crate::{Date, QualityMetric, Result, ResultRow, types::FundamentalRecord};
use std::future::Future;

/// Source of cleaned financial statements.
///
/// # Preconditions
///
/// Implementations must return records that are already deduplicated by
/// (`security_id`, `period_end_date`, `report_kind`) and that never carry a
/// zero revenue. The core does not re-validate either property.
pub trait FundamentalsProvider {
    /// Returns the full historical fundamentals table.
    ///
    /// # Errors
    ///
    /// Any error here is fatal for a backtest run.
    fn fundamentals(&self) -> Result<Vec<FundamentalRecord>>;
}

/// Source of daily returns.
///
/// Implementations should be thread-safe (`Send + Sync`) so lookups can run
/// concurrently.
pub trait PriceProvider: Send + Sync {
    /// Daily fractional price changes for `security_id` over
    /// `[start, end]`, oldest first.
    ///
    /// An empty vector means "no data" (delisted, no trading days, unknown
    /// code). Errors are reserved for transport or data failures.
    fn daily_returns(
        &self,
        security_id: &str,
        start: Date,
        end: Date,
    ) -> impl Future<Output = Result<Vec<f64>>> + Send;
}

/// Destination of per-pair result tables.
pub trait ResultSink {
    /// Persists the result table of one (report date, metric) pair.
    ///
    /// `rows` are in the cross-section's original order.
    fn write(&mut self, report_date: Date, metric: QualityMetric, rows: &[ResultRow])
    -> Result<()>;
}

impl<S: ResultSink + ?Sized> ResultSink for &mut S {
    fn write(
        &mut self,
        report_date: Date,
        metric: QualityMetric,
        rows: &[ResultRow],
    ) -> Result<()> {
        (**self).write(report_date, metric, rows)
    }
}

impl<P: PriceProvider> PriceProvider for std::sync::Arc<P> {
    fn daily_returns(
        &self,
        security_id: &str,
        start: Date,
        end: Date,
    ) -> impl Future<Output = Result<Vec<f64>>> + Send {
        (**self).daily_returns(security_id, start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReportKind;

    struct StaticFundamentals;

    impl FundamentalsProvider for StaticFundamentals {
        fn fundamentals(&self) -> Result<Vec<FundamentalRecord>> {
            Ok(vec![FundamentalRecord {
                security_id: "005930".to_string(),
                period_end_date: Date::from_ymd_opt(2023, 3, 31).unwrap(),
                report_kind: ReportKind::Q1,
                revenue: 100.0,
                operating_income: 10.0,
                net_income: 8.0,
                total_equity: 50.0,
                total_assets: 200.0,
            }])
        }
    }

    struct ConstantReturns(f64);

    impl PriceProvider for ConstantReturns {
        async fn daily_returns(&self, _security_id: &str, _start: Date, _end: Date) -> Result<Vec<f64>> {
            Ok(vec![self.0; 3])
        }
    }

    #[derive(Default)]
    struct CountingSink(usize);

    impl ResultSink for CountingSink {
        fn write(&mut self, _: Date, _: QualityMetric, rows: &[ResultRow]) -> Result<()> {
            self.0 += rows.len();
            Ok(())
        }
    }

    #[test]
    fn test_fundamentals_provider() {
        let records = StaticFundamentals.fundamentals().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].report_kind, ReportKind::Q1);
    }

    #[tokio::test]
    async fn test_price_provider_through_arc() {
        let provider = std::sync::Arc::new(ConstantReturns(0.01));
        let date = Date::from_ymd_opt(2023, 4, 1).unwrap();
        let returns = provider.daily_returns("005930", date, date).await.unwrap();
        assert_eq!(returns, vec![0.01; 3]);
    }

    fn write_twice<S: ResultSink>(mut sink: S, rows: &[ResultRow]) {
        let date = Date::from_ymd_opt(2023, 3, 31).unwrap();
        sink.write(date, QualityMetric::NetMargin, rows).unwrap();
        sink.write(date, QualityMetric::ReturnOnAssets, rows).unwrap();
    }

    #[test]
    fn test_sink_through_mut_ref() {
        let mut sink = CountingSink::default();
        let row = ResultRow {
            security_id: "005930".to_string(),
            report_date: Date::from_ymd_opt(2023, 3, 31).unwrap(),
            group: 1,
            cumulative_return: None,
            return_std_dev: None,
            score: None,
        };
        write_twice(&mut sink, &[row]);
        assert_eq!(sink.0, 2);
    }

    #[test]
    fn test_price_provider_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ConstantReturns>();
    }
}
