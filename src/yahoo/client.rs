// =============================================================================
// Yahoo Finance chart API client: daily bars for one ticker
// =============================================================================
//
// GET {base}/v8/finance/chart/{ticker}?period1=..&period2=..&interval=1d
//
// The response carries parallel arrays (timestamp, open, high, low, close,
// volume, adjclose) that may contain nulls for sessions without trades.  Such
// sessions are skipped.  An unknown ticker (HTTP 404 or a `chart.error` with
// no result) is reported as an empty quote, not as an error.
// =============================================================================

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::market_data::{PriceBar, PriceSeries, Quote, QuoteFetcher, QuoteMetadata};

/// Chart API rejects requests without a browser-like agent.
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Sessions in a trading year, used when the provider omits 52-week extremes.
const SESSIONS_PER_YEAR: usize = 252;
/// Sessions averaged for the average-volume figure (about three months).
const AVERAGE_VOLUME_SESSIONS: usize = 63;

#[derive(Clone)]
pub struct YahooClient {
    base_url: String,
    client: reqwest::Client,
    auto_adjust: bool,
}

impl YahooClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Create a client against `base_url` (no trailing slash needed).
    pub fn new(base_url: impl Into<String>, timeout: Duration, auto_adjust: bool) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(base_url = %base_url, auto_adjust, "YahooClient initialised");

        Ok(Self {
            base_url,
            client,
            auto_adjust,
        })
    }

    // -------------------------------------------------------------------------
    // Public market data
    // -------------------------------------------------------------------------

    /// GET /v8/finance/chart/{ticker} for daily bars between two UNIX
    /// timestamps.  Returns `None` on 404.
    #[instrument(skip(self), name = "yahoo::get_chart")]
    pub async fn get_chart(&self, ticker: &str, period1: i64, period2: i64) -> Result<Option<Value>> {
        let mut url = reqwest::Url::parse(&format!("{}/v8/finance/chart/", self.base_url))
            .with_context(|| format!("invalid quote base URL '{}'", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("quote base URL '{}' cannot carry a path", self.base_url))?
            .pop_if_empty()
            .push(ticker);

        let resp = self
            .client
            .get(url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("includeAdjustedClose", "true".to_string()),
            ])
            .send()
            .await
            .context("GET /v8/finance/chart request failed")?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            debug!(ticker, "chart endpoint returned 404");
            return Ok(None);
        }

        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Yahoo GET /v8/finance/chart/{} returned {}: {}", ticker, status, text);
        }

        let body: Value = resp
            .json()
            .await
            .context("failed to parse chart response")?;

        Ok(Some(body))
    }
}

#[async_trait]
impl QuoteFetcher for YahooClient {
    async fn fetch(&self, ticker: &str, lookback_days: u32) -> Result<Quote> {
        let end = Utc::now();
        let start = end - chrono::Duration::days(i64::from(lookback_days));

        match self.get_chart(ticker, start.timestamp(), end.timestamp()).await? {
            Some(body) => parse_chart(ticker, &body, self.auto_adjust),
            None => Ok(Quote::not_found(ticker)),
        }
    }
}

impl std::fmt::Debug for YahooClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooClient")
            .field("base_url", &self.base_url)
            .field("auto_adjust", &self.auto_adjust)
            .finish()
    }
}

// =============================================================================
// Response parsing
// =============================================================================

/// Convert a chart response body into a [`Quote`].
pub fn parse_chart(ticker: &str, body: &Value, auto_adjust: bool) -> Result<Quote> {
    let Some(result) = body["chart"]["result"].as_array().and_then(|r| r.first()) else {
        if let Some(code) = body["chart"]["error"]["code"].as_str() {
            debug!(ticker, code, "chart API reported an error");
        }
        return Ok(Quote::not_found(ticker));
    };

    let Some(timestamps) = result["timestamp"].as_array() else {
        return Ok(Quote::not_found(ticker));
    };

    let meta = &result["meta"];
    let quote = &result["indicators"]["quote"][0];
    let adjclose = &result["indicators"]["adjclose"][0]["adjclose"];
    let gmtoffset = meta["gmtoffset"].as_i64().unwrap_or(0);

    let mut bars: Vec<PriceBar> = Vec::with_capacity(timestamps.len());
    let mut skipped = 0usize;

    for (i, ts) in timestamps.iter().enumerate() {
        let ts = ts.as_i64().with_context(|| format!("timestamp {i} is not an integer"))?;
        let ohlc = (
            quote["open"][i].as_f64(),
            quote["high"][i].as_f64(),
            quote["low"][i].as_f64(),
            quote["close"][i].as_f64(),
        );
        let (Some(mut open), Some(mut high), Some(mut low), Some(mut close)) = ohlc else {
            skipped += 1;
            continue;
        };

        if auto_adjust {
            if let Some(adj) = adjclose[i].as_f64().filter(|_| close != 0.0) {
                let ratio = adj / close;
                open *= ratio;
                high *= ratio;
                low *= ratio;
                close = adj;
            }
        }

        let volume = quote["volume"][i]
            .as_u64()
            .or_else(|| quote["volume"][i].as_f64().map(|v| v.max(0.0) as u64))
            .unwrap_or(0);

        let date = DateTime::from_timestamp(ts + gmtoffset, 0)
            .with_context(|| format!("timestamp {ts} out of range"))?
            .date_naive();

        bars.push(PriceBar::new(date, open, high, low, close, volume));
    }

    if skipped > 0 {
        debug!(ticker, skipped, "skipped sessions with missing prices");
    }

    // Provider data can repeat the live session; keep the latest row per date.
    bars.sort_by_key(|b| b.date);
    let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match deduped.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => deduped.push(bar),
        }
    }

    if deduped.is_empty() {
        warn!(ticker, "chart response contained no usable sessions");
        return Ok(Quote::not_found(ticker));
    }

    let metadata = parse_metadata(meta, &deduped);
    let series = PriceSeries::new(ticker, deduped)?;

    Ok(Quote {
        series,
        metadata: Some(metadata),
    })
}

fn parse_metadata(meta: &Value, bars: &[PriceBar]) -> QuoteMetadata {
    let name = ["longName", "shortName"]
        .iter()
        .filter_map(|key| meta[*key].as_str())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string);

    let year = &bars[bars.len().saturating_sub(SESSIONS_PER_YEAR)..];
    let fifty_two_week_high = meta["fiftyTwoWeekHigh"]
        .as_f64()
        .or_else(|| year.iter().map(|b| b.high).reduce(f64::max));
    let fifty_two_week_low = meta["fiftyTwoWeekLow"]
        .as_f64()
        .or_else(|| year.iter().map(|b| b.low).reduce(f64::min));

    let recent = &bars[bars.len().saturating_sub(AVERAGE_VOLUME_SESSIONS)..];
    let average_volume = if recent.is_empty() {
        None
    } else {
        Some(recent.iter().map(|b| b.volume as f64).sum::<f64>() / recent.len() as f64)
    };

    QuoteMetadata {
        name,
        fifty_two_week_high,
        fifty_two_week_low,
        average_volume,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // 2024-03-01 14:30 UTC and the two following days.
    const T0: i64 = 1_709_303_400;
    const DAY: i64 = 86_400;

    fn chart_body() -> Value {
        json!({
            "chart": {
                "result": [{
                    "meta": {
                        "symbol": "AAPL",
                        "longName": "Apple Inc.",
                        "shortName": "Apple",
                        "gmtoffset": -18000,
                        "fiftyTwoWeekHigh": 199.62,
                        "fiftyTwoWeekLow": 164.08
                    },
                    "timestamp": [T0, T0 + DAY, T0 + 2 * DAY, T0 + 3 * DAY],
                    "indicators": {
                        "quote": [{
                            "open":   [100.0, 102.0, null, 104.0],
                            "high":   [101.0, 103.0, 104.0, 105.0],
                            "low":    [99.0, 101.0, 102.0, 103.0],
                            "close":  [100.0, 102.0, 103.0, 104.0],
                            "volume": [1000, 2000, 3000, null]
                        }],
                        "adjclose": [{ "adjclose": [50.0, 51.0, 51.5, 52.0] }]
                    }
                }],
                "error": null
            }
        })
    }

    fn not_found_body() -> Value {
        json!({
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
            }
        })
    }

    #[test]
    fn parse_skips_null_sessions_and_shifts_dates() {
        let quote = parse_chart("AAPL", &chart_body(), false).unwrap();
        let bars = quote.series.bars();
        assert_eq!(bars.len(), 3);
        // 14:30 UTC minus five hours is still the same calendar day.
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(bars[2].date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(bars[1].close, 102.0);
        assert_eq!(bars[2].volume, 0);
    }

    #[test]
    fn parse_auto_adjust_scales_ohlc() {
        let quote = parse_chart("AAPL", &chart_body(), true).unwrap();
        let first = &quote.series.bars()[0];
        assert_eq!(first.close, 50.0);
        assert!((first.open - 50.0).abs() < 1e-12);
        assert!((first.high - 50.5).abs() < 1e-12);
        assert!((first.low - 49.5).abs() < 1e-12);
    }

    #[test]
    fn parse_metadata_fields() {
        let quote = parse_chart("AAPL", &chart_body(), false).unwrap();
        let meta = quote.metadata.unwrap();
        assert_eq!(meta.name.as_deref(), Some("Apple Inc."));
        assert_eq!(meta.fifty_two_week_high, Some(199.62));
        assert_eq!(meta.fifty_two_week_low, Some(164.08));
        assert_eq!(meta.average_volume, Some(1000.0));
    }

    #[test]
    fn parse_metadata_falls_back_to_bars() {
        let mut body = chart_body();
        let meta = &mut body["chart"]["result"][0]["meta"];
        meta["longName"] = Value::Null;
        meta["fiftyTwoWeekHigh"] = Value::Null;
        meta["fiftyTwoWeekLow"] = Value::Null;

        let meta = parse_chart("AAPL", &body, false).unwrap().metadata.unwrap();
        assert_eq!(meta.name.as_deref(), Some("Apple"));
        assert_eq!(meta.fifty_two_week_high, Some(105.0));
        assert_eq!(meta.fifty_two_week_low, Some(99.0));
    }

    #[test]
    fn parse_duplicate_session_keeps_latest() {
        let mut body = chart_body();
        // Second timestamp moved to later on the first day.
        body["chart"]["result"][0]["timestamp"][1] = json!(T0 + 3600);
        let quote = parse_chart("AAPL", &body, false).unwrap();
        let bars = quote.series.bars();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 102.0);
    }

    #[test]
    fn parse_error_body_is_not_found() {
        let quote = parse_chart("ZZZZZ", &not_found_body(), true).unwrap();
        assert!(quote.series.is_empty());
        assert!(quote.metadata.is_none());
    }

    #[test]
    fn parse_result_without_timestamps_is_not_found() {
        let body = json!({ "chart": { "result": [{ "meta": {}, "indicators": { "quote": [{}] } }] } });
        assert!(parse_chart("NEW", &body, true).unwrap().series.is_empty());
    }

    #[tokio::test]
    async fn fetch_against_mock_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/AAPL"))
            .and(query_param("interval", "1d"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chart_body()))
            .mount(&server)
            .await;

        let client = YahooClient::new(server.uri(), Duration::from_secs(5), false).unwrap();
        let quote = client.fetch("AAPL", 400).await.unwrap();
        assert_eq!(quote.series.len(), 3);
        assert_eq!(quote.series.ticker(), "AAPL");
    }

    #[tokio::test]
    async fn fetch_404_is_empty_quote() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/NOPE"))
            .respond_with(ResponseTemplate::new(404).set_body_json(not_found_body()))
            .mount(&server)
            .await;

        let client = YahooClient::new(server.uri(), Duration::from_secs(5), true).unwrap();
        let quote = client.fetch("NOPE", 400).await.unwrap();
        assert!(quote.series.is_empty());
    }

    #[tokio::test]
    async fn fetch_server_error_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "boom" })))
            .mount(&server)
            .await;

        let client = YahooClient::new(server.uri(), Duration::from_secs(5), true).unwrap();
        let err = client.fetch("AAPL", 400).await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }
}
