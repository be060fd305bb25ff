//! Financial Modeling Prep (FMP) price source for salou.
//!
//! This crate wraps the end-of-day price endpoint of the
//! [Financial Modeling Prep](https://financialmodelingprep.com/) API and
//! exposes it as a [`salou_traits::PriceProvider`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use salou_fmp::{FmpClient, FmpPriceProvider};
//!
//! let client = FmpClient::from_env()?;
//! // Korean listings are quoted with an exchange suffix on FMP
//! let prices = FmpPriceProvider::new(client).with_suffix(".KS");
//! ```
//!
//! # Environment Variables
//!
//! Set `FMP_API_KEY` in your environment or `.env` file:
//!
//! ```bash
//! FMP_API_KEY=your_api_key_here
//! ```

mod client;
mod error;
mod provider;
mod types;

pub use client::FmpClient;
pub use error::FmpError;
pub use provider::FmpPriceProvider;
pub use types::HistoricalPrice;

/// Result type for FMP operations.
pub type Result<T> = std::result::Result<T, FmpError>;
