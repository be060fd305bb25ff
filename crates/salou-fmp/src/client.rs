//! FMP API client implementation.

use crate::{Result, error::FmpError, types::HistoricalPrice};
use chrono::NaiveDate;
use reqwest::Client;
use std::env;

/// Base URL for the FMP stable API.
const FMP_BASE_URL: &str = "https://financialmodelingprep.com/stable";

/// Financial Modeling Prep API client.
#[derive(Debug, Clone)]
pub struct FmpClient {
    client: Client,
    api_key: String,
}

impl FmpClient {
    /// Create a new FMP client with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Create a new FMP client from the `FMP_API_KEY` environment variable.
    ///
    /// This will also load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment variable is not set.
    pub fn from_env() -> Result<Self> {
        // Try to load .env file (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_key = env::var("FMP_API_KEY").map_err(|_| FmpError::MissingApiKey)?;

        Ok(Self::new(api_key))
    }

    /// Build a URL with the API key.
    fn url(&self, endpoint: &str) -> String {
        if endpoint.contains('?') {
            format!("{FMP_BASE_URL}/{endpoint}&apikey={}", self.api_key)
        } else {
            format!("{FMP_BASE_URL}/{endpoint}?apikey={}", self.api_key)
        }
    }

    /// Make a GET request and parse the JSON response.
    async fn get<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = self.url(endpoint);
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FmpError::RateLimitExceeded);
        }

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(FmpError::Api(format!("HTTP {status}: {text}")));
        }

        let text = response.text().await?;

        if text.contains("\"Error Message\"") {
            return Err(FmpError::Api(text));
        }

        Ok(serde_json::from_str(&text)?)
    }

    /// Get historical daily prices for a symbol over `[from, to]`.
    ///
    /// Bars come back newest first, as the API sends them. An unknown symbol
    /// yields an empty vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn historical_prices(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<HistoricalPrice>> {
        let endpoint = format!(
            "historical-price-eod/full?symbol={}&from={}&to={}",
            symbol.to_uppercase(),
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d"),
        );
        // The stable API returns a flat array, not a wrapped response
        self.get(&endpoint).await
    }
}
