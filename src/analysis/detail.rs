// =============================================================================
// Single-ticker detail: everything the dashboard view shows for one symbol
// =============================================================================

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

use crate::indicators::atr::atr_percent_of_price;
use crate::indicators::{IndicatorParams, IndicatorSeries};
use crate::market_data::{Quote, QuoteFetcher};
use crate::types::{gap_percent, Trend};

/// One chart row: the session's bar plus the indicator values at that session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub sma: Option<f64>,
    pub atr: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerDetail {
    pub ticker: String,
    /// Company name, or the ticker when the provider has none.
    pub name: String,
    pub current_price: f64,
    /// Change versus the previous session's close, in percent.
    pub day_change_percent: Option<f64>,
    pub sma: Option<f64>,
    pub gap_percent: Option<f64>,
    pub trend: Option<Trend>,
    pub atr: Option<f64>,
    pub atr_percent_of_price: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub volume: u64,
    pub average_volume: Option<f64>,
    pub chart: Vec<ChartPoint>,
}

impl TickerDetail {
    /// `None` when the quote has no bars.
    pub fn from_quote(ticker: &str, quote: &Quote, params: IndicatorParams) -> Option<Self> {
        let bars = quote.series.bars();
        let last = bars.last()?;
        let indicators = IndicatorSeries::compute(&quote.series, params);

        let current_price = last.close;
        let day_change_percent = bars
            .len()
            .checked_sub(2)
            .map(|i| bars[i].close)
            .filter(|prev| *prev != 0.0)
            .map(|prev| (current_price - prev) / prev * 100.0);

        let sma = indicators.latest_sma();
        let atr = indicators.latest_atr();
        let metadata = quote.metadata.clone().unwrap_or_default();

        let chart = bars
            .iter()
            .zip(indicators.sma.iter().zip(indicators.atr.iter()))
            .map(|(bar, (sma, atr))| ChartPoint {
                date: bar.date,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
                sma: *sma,
                atr: *atr,
            })
            .collect();

        Some(Self {
            ticker: ticker.to_string(),
            name: metadata.name.unwrap_or_else(|| ticker.to_string()),
            current_price,
            day_change_percent,
            sma,
            gap_percent: gap_percent(current_price, sma),
            trend: sma.map(|avg| Trend::classify(current_price, avg)),
            atr,
            atr_percent_of_price: atr.and_then(|a| atr_percent_of_price(a, current_price)),
            fifty_two_week_high: metadata.fifty_two_week_high,
            fifty_two_week_low: metadata.fifty_two_week_low,
            volume: last.volume,
            average_volume: metadata.average_volume,
            chart,
        })
    }
}

/// Fetch and build the detail view.  `Ok(None)` means the ticker has no data.
pub async fn ticker_detail(
    fetcher: &dyn QuoteFetcher,
    ticker: &str,
    lookback_days: u32,
    params: IndicatorParams,
) -> Result<Option<TickerDetail>> {
    let quote = fetcher.fetch(ticker, lookback_days).await?;
    Ok(TickerDetail::from_quote(ticker, &quote, params))
}
