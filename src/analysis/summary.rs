// =============================================================================
// Summary Builder: one flat record per ticker
// =============================================================================
//
// Fetch, compute, take the last session.  Any failure for a ticker (transport
// error, empty series) collapses to `None` for that ticker alone; the caller
// records it as failed and moves on.
// =============================================================================

use serde::Serialize;
use tracing::{debug, warn};

use crate::indicators::{IndicatorParams, IndicatorSeries};
use crate::market_data::{PriceSeries, QuoteFetcher};
use crate::types::gap_percent;

/// Latest price and indicator values for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRecord {
    pub ticker: String,
    pub current_price: f64,
    pub sma: Option<f64>,
    pub gap_percent: Option<f64>,
    pub atr: Option<f64>,
}

impl SummaryRecord {
    /// Build the record from an already-fetched series; `None` when empty.
    pub fn from_series(ticker: &str, series: &PriceSeries, params: IndicatorParams) -> Option<Self> {
        let current_price = series.last()?.close;
        let indicators = IndicatorSeries::compute(series, params);
        let sma = indicators.latest_sma();

        Some(Self {
            ticker: ticker.to_string(),
            current_price,
            sma,
            gap_percent: gap_percent(current_price, sma),
            atr: indicators.latest_atr(),
        })
    }
}

/// Fetch `ticker` and summarise it.  Never returns an error: failures are
/// logged and reported as `None`.
pub async fn summarize(
    fetcher: &dyn QuoteFetcher,
    ticker: &str,
    lookback_days: u32,
    params: IndicatorParams,
) -> Option<SummaryRecord> {
    let quote = match fetcher.fetch(ticker, lookback_days).await {
        Ok(quote) => quote,
        Err(e) => {
            warn!(ticker, error = %format!("{e:#}"), "quote fetch failed");
            return None;
        }
    };

    let series = &quote.series;
    if series.is_empty() {
        debug!(ticker = series.ticker(), "no price data");
        return None;
    }

    debug!(ticker = series.ticker(), sessions = series.len(), "computing summary");
    SummaryRecord::from_series(ticker, series, params)
}
