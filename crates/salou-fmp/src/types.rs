//! Data types for FMP API responses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One end-of-day bar.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalPrice {
    /// Trading date, `YYYY-MM-DD`.
    pub date: String,
    /// Ticker symbol.
    #[serde(default)]
    pub symbol: String,
    /// Close price.
    pub close: f64,
    /// Volume.
    #[serde(default)]
    pub volume: f64,
}

impl HistoricalPrice {
    /// Parse the date string into a NaiveDate.
    #[must_use]
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stable_payload() {
        let json = r#"[
            {"symbol": "005930.KS", "date": "2023-04-04", "open": 63000, "close": 63100, "volume": 1200},
            {"symbol": "005930.KS", "date": "2023-04-03", "close": 62000}
        ]"#;
        let bars: Vec<HistoricalPrice> = serde_json::from_str(json).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 63100.0);
        assert_eq!(bars[1].volume, 0.0);
        assert_eq!(bars[1].parsed_date(), NaiveDate::from_ymd_opt(2023, 4, 3));
    }
}
