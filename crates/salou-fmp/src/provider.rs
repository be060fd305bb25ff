//! [`PriceProvider`] backed by the FMP end-of-day endpoint.

use crate::{FmpClient, HistoricalPrice};
use chrono::Days;
use salou_traits::stats::close_to_close;
use salou_traits::{Date, PriceProvider, Result, SalouError};
use std::future::Future;

/// Calendar days fetched ahead of a window so its first day has a prior close.
const LOOKBACK_DAYS: u64 = 10;

/// Daily returns computed from FMP closing prices.
#[derive(Debug, Clone)]
pub struct FmpPriceProvider {
    client: FmpClient,
    suffix: String,
}

impl FmpPriceProvider {
    /// Provider querying security ids as-is.
    pub fn new(client: FmpClient) -> Self {
        Self {
            client,
            suffix: String::new(),
        }
    }

    /// Append `suffix` (e.g. `".KS"`) to every security id before querying.
    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Ticker queried for `security_id`.
    pub fn symbol_for(&self, security_id: &str) -> String {
        format!("{security_id}{}", self.suffix)
    }
}

/// Sorted `(date, close)` pairs, skipping bars with an unreadable date or a
/// non-positive close.
fn sorted_closes(bars: &[HistoricalPrice]) -> Vec<(Date, f64)> {
    let mut closes: Vec<(Date, f64)> = bars
        .iter()
        .filter(|bar| bar.close > 0.0)
        .filter_map(|bar| bar.parsed_date().map(|date| (date, bar.close)))
        .collect();
    closes.sort_by_key(|(date, _)| *date);
    closes.dedup_by_key(|(date, _)| *date);
    closes
}

impl PriceProvider for FmpPriceProvider {
    fn daily_returns(
        &self,
        security_id: &str,
        start: Date,
        end: Date,
    ) -> impl Future<Output = Result<Vec<f64>>> + Send {
        let symbol = self.symbol_for(security_id);
        let from = start.checked_sub_days(Days::new(LOOKBACK_DAYS)).unwrap_or(start);
        async move {
            let bars = self
                .client
                .historical_prices(&symbol, from, end)
                .await
                .map_err(|e| SalouError::PriceLookup {
                    security_id: symbol.clone(),
                    message: e.to_string(),
                })?;
            tracing::debug!(%symbol, bars = bars.len(), "prices fetched");
            Ok(close_to_close(&sorted_closes(&bars), start, end))
        }
    }
}
