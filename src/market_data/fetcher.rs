// =============================================================================
// Quote Fetcher: the market-data provider boundary
// =============================================================================
//
// Given a ticker and a calendar-day lookback, a fetcher returns the daily
// price series plus descriptive metadata.  Unknown tickers must come back as
// an empty series (`Quote::not_found`), never as an error; errors are reserved
// for transport / decoding failures.
// =============================================================================

use anyhow::Result;
use async_trait::async_trait;

use super::Quote;

#[async_trait]
pub trait QuoteFetcher: Send + Sync {
    async fn fetch(&self, ticker: &str, lookback_days: u32) -> Result<Quote>;
}

#[cfg(test)]
pub mod testing {
    //! In-memory fetcher used by the analysis and API tests.

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use chrono::{Days, NaiveDate};

    use super::QuoteFetcher;
    use crate::market_data::{PriceBar, PriceSeries, Quote, QuoteMetadata};

    #[derive(Default)]
    pub struct StaticQuoteFetcher {
        quotes: HashMap<String, Quote>,
        failing: Vec<String>,
        calls: AtomicUsize,
    }

    impl StaticQuoteFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_quote(mut self, quote: Quote) -> Self {
            self.quotes.insert(quote.series.ticker().to_string(), quote);
            self
        }

        /// Register `ticker` with a series built from `closes` (one session
        /// per day, high/low one unit around the close).
        pub fn with_closes(self, ticker: &str, closes: &[f64]) -> Self {
            self.with_quote(quote_from_closes(ticker, closes))
        }

        /// Make every fetch of `ticker` fail with a transport-style error.
        pub fn failing(mut self, ticker: &str) -> Self {
            self.failing.push(ticker.to_string());
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QuoteFetcher for StaticQuoteFetcher {
        async fn fetch(&self, ticker: &str, _lookback_days: u32) -> Result<Quote> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.iter().any(|t| t == ticker) {
                return Err(anyhow!("connection reset while fetching {ticker}"));
            }
            Ok(self
                .quotes
                .get(ticker)
                .cloned()
                .unwrap_or_else(|| Quote::not_found(ticker)))
        }
    }

    pub fn quote_from_closes(ticker: &str, closes: &[f64]) -> Quote {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let date = start.checked_add_days(Days::new(i as u64)).unwrap();
                PriceBar::new(date, c, c + 1.0, c - 1.0, c, 1_000 + i as u64)
            })
            .collect();
        Quote {
            series: PriceSeries::new(ticker, bars).unwrap(),
            metadata: Some(QuoteMetadata {
                name: Some(format!("{ticker} Corp.")),
                fifty_two_week_high: closes.iter().cloned().reduce(f64::max),
                fifty_two_week_low: closes.iter().cloned().reduce(f64::min),
                average_volume: Some(1_500.0),
            }),
        }
    }

    /// Linear closes from `from` to `to` inclusive over `n` sessions.
    pub fn linear(from: f64, to: f64, n: usize) -> Vec<f64> {
        let step = (to - from) / (n - 1) as f64;
        (0..n).map(|i| from + step * i as f64).collect()
    }
}
