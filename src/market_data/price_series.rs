// =============================================================================
// Price Series: ordered daily OHLCV bars for a single ticker
// =============================================================================
//
// Every rolling computation in the indicator engine depends on the bars being
// in ascending session order with no duplicates.  `PriceSeries::new` enforces
// that invariant (and finiteness of all prices) once, at construction, so the
// indicator code can index freely without re-checking.
// =============================================================================

use anyhow::{bail, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    fn is_finite(&self) -> bool {
        self.open.is_finite() && self.high.is_finite() && self.low.is_finite() && self.close.is_finite()
    }
}

/// Ascending, duplicate-free sequence of [`PriceBar`]s for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series, rejecting out-of-order or duplicate sessions and
    /// non-finite prices.
    pub fn new(ticker: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self> {
        let ticker = ticker.into();

        for (i, bar) in bars.iter().enumerate() {
            if !bar.is_finite() {
                bail!("{ticker}: non-finite price in session {}", bar.date);
            }
            if i > 0 && bars[i - 1].date >= bar.date {
                bail!(
                    "{ticker}: sessions out of order ({} followed by {})",
                    bars[i - 1].date,
                    bar.date
                );
            }
        }

        Ok(Self { ticker, bars })
    }

    /// A series with no bars (unknown ticker, no history in range).
    pub fn empty(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            bars: Vec::new(),
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Close prices in session order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

/// Descriptive data returned alongside a price series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteMetadata {
    pub name: Option<String>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub average_volume: Option<f64>,
}

/// Everything the quote fetcher hands back for one ticker.
#[derive(Debug, Clone)]
pub struct Quote {
    pub series: PriceSeries,
    pub metadata: Option<QuoteMetadata>,
}

impl Quote {
    /// The "no data" outcome for an unknown ticker.
    pub fn not_found(ticker: impl Into<String>) -> Self {
        Self {
            series: PriceSeries::empty(ticker),
            metadata: None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn bar(d: u32, close: f64) -> PriceBar {
        PriceBar::new(day(d), close, close + 1.0, close - 1.0, close, 1_000)
    }

    #[test]
    fn accepts_ascending_sessions() {
        let series = PriceSeries::new("AAPL", vec![bar(1, 10.0), bar(4, 11.0), bar(5, 12.0)]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.ticker(), "AAPL");
        assert_eq!(series.closes(), vec![10.0, 11.0, 12.0]);
        assert_eq!(series.last().unwrap().date, day(5));
    }

    #[test]
    fn rejects_duplicate_session() {
        let err = PriceSeries::new("AAPL", vec![bar(1, 10.0), bar(1, 11.0)]).unwrap_err();
        assert!(err.to_string().contains("out of order"));
    }

    #[test]
    fn rejects_descending_sessions() {
        assert!(PriceSeries::new("AAPL", vec![bar(5, 10.0), bar(4, 11.0)]).is_err());
    }

    #[test]
    fn rejects_non_finite_prices() {
        let mut bad = bar(2, 10.0);
        bad.high = f64::NAN;
        assert!(PriceSeries::new("AAPL", vec![bar(1, 10.0), bad]).is_err());
    }

    #[test]
    fn not_found_quote_is_empty() {
        let quote = Quote::not_found("ZZZZ");
        assert!(quote.series.is_empty());
        assert!(quote.metadata.is_none());
        assert_eq!(quote.series.ticker(), "ZZZZ");
    }
}
