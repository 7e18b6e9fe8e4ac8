// =============================================================================
// Batch Orchestration: sequential portfolio analysis
// =============================================================================
//
// Tickers are processed one at a time, in input order.  Each ticker either
// lands in `succeeded` or in `failed`; one bad ticker never stops the batch.
// A cooperative cancellation flag is checked between tickers only.
//
// Aggregate gap statistics consider only records with a defined gap: such a
// record counts as above (gap > 0), below (gap < 0) or neither (gap == 0), and
// contributes to the mean.  Undefined gaps are excluded explicitly.
// =============================================================================

use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tracing::info;

use super::summary::{summarize, SummaryRecord};
use crate::indicators::IndicatorParams;
use crate::market_data::QuoteFetcher;

/// Progress notification emitted before each ticker is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress<'a> {
    /// Zero-based position of `ticker` in the batch.
    pub index: usize,
    pub total: usize,
    pub ticker: &'a str,
}

/// Above/below counts and mean over records with a defined gap.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GapStats {
    pub with_gap: usize,
    pub above: usize,
    pub below: usize,
    pub mean_gap_percent: Option<f64>,
}

impl GapStats {
    pub fn from_records(records: &[SummaryRecord]) -> Self {
        let gaps: Vec<f64> = records.iter().filter_map(|r| r.gap_percent).collect();
        let mean_gap_percent = if gaps.is_empty() {
            None
        } else {
            Some(gaps.iter().sum::<f64>() / gaps.len() as f64)
        };

        Self {
            with_gap: gaps.len(),
            above: gaps.iter().filter(|g| **g > 0.0).count(),
            below: gaps.iter().filter(|g| **g < 0.0).count(),
            mean_gap_percent,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub succeeded: Vec<SummaryRecord>,
    pub failed: Vec<String>,
    pub stats: GapStats,
    /// True when the batch stopped early; unprocessed tickers appear in
    /// neither list.
    pub cancelled: bool,
}

/// Sequential batch runner.
pub struct BatchRunner<'a> {
    fetcher: &'a dyn QuoteFetcher,
    lookback_days: u32,
    params: IndicatorParams,
    cancel: Option<&'a AtomicBool>,
}

impl<'a> BatchRunner<'a> {
    pub fn new(fetcher: &'a dyn QuoteFetcher, lookback_days: u32, params: IndicatorParams) -> Self {
        Self {
            fetcher,
            lookback_days,
            params,
            cancel: None,
        }
    }

    /// Stop before the next ticker once `flag` is set.
    pub fn with_cancel(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub async fn run<F>(&self, tickers: &[String], mut on_progress: F) -> BatchReport
    where
        F: FnMut(BatchProgress<'_>),
    {
        let mut report = BatchReport::default();

        for (index, ticker) in tickers.iter().enumerate() {
            if self.cancel.is_some_and(|flag| flag.load(Ordering::SeqCst)) {
                info!(processed = index, total = tickers.len(), "batch cancelled");
                report.cancelled = true;
                break;
            }

            on_progress(BatchProgress {
                index,
                total: tickers.len(),
                ticker,
            });

            match summarize(self.fetcher, ticker, self.lookback_days, self.params).await {
                Some(record) => report.succeeded.push(record),
                None => report.failed.push(ticker.clone()),
            }
        }

        report.stats = GapStats::from_records(&report.succeeded);
        info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            above = report.stats.above,
            below = report.stats.below,
            "batch complete"
        );
        report
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::fetcher::testing::{linear, StaticQuoteFetcher};

    fn tickers(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    fn record(ticker: &str, gap: Option<f64>) -> SummaryRecord {
        SummaryRecord {
            ticker: ticker.into(),
            current_price: 10.0,
            sma: gap.map(|_| 10.0),
            gap_percent: gap,
            atr: None,
        }
    }

    fn portfolio() -> StaticQuoteFetcher {
        StaticQuoteFetcher::new()
            .with_closes("UPUP", &linear(100.0, 150.0, 200))
            .with_closes("DOWN", &linear(150.0, 100.0, 200))
            .with_closes("IPO", &linear(10.0, 12.0, 20))
            .failing("BOOM")
    }

    #[tokio::test]
    async fn failures_are_isolated_and_order_preserved() {
        let fetcher = portfolio();
        let report = BatchRunner::new(&fetcher, 400, IndicatorParams::default())
            .run(&tickers(&["BOOM", "UPUP", "NOPE", "DOWN", "IPO"]), |_| {})
            .await;

        let ok: Vec<_> = report.succeeded.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(ok, vec!["UPUP", "DOWN", "IPO"]);
        assert_eq!(report.failed, vec!["BOOM", "NOPE"]);
        assert!(!report.cancelled);
        assert_eq!(fetcher.calls(), 5);

        // IPO has no SMA, so it is excluded from every aggregate.
        assert_eq!(report.stats.with_gap, 2);
        assert_eq!(report.stats.above, 1);
        assert_eq!(report.stats.below, 1);
        assert!(report.stats.above + report.stats.below <= report.succeeded.len());
    }

    #[tokio::test]
    async fn progress_reports_every_ticker() {
        let fetcher = portfolio();
        let mut seen = Vec::new();
        BatchRunner::new(&fetcher, 400, IndicatorParams::default())
            .run(&tickers(&["UPUP", "DOWN"]), |p| seen.push((p.index, p.total, p.ticker.to_string())))
            .await;
        assert_eq!(seen, vec![(0, 2, "UPUP".to_string()), (1, 2, "DOWN".to_string())]);
    }

    #[tokio::test]
    async fn cancellation_stops_before_next_ticker() {
        let fetcher = portfolio();
        let flag = AtomicBool::new(false);
        let report = BatchRunner::new(&fetcher, 400, IndicatorParams::default())
            .with_cancel(&flag)
            .run(&tickers(&["UPUP", "DOWN", "IPO"]), |p| {
                if p.index == 1 {
                    flag.store(true, Ordering::SeqCst);
                }
            })
            .await;

        // DOWN was already announced when the flag flipped, so it still runs.
        assert_eq!(report.succeeded.len(), 2);
        assert!(report.failed.is_empty());
        assert!(report.cancelled);
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn empty_batch() {
        let fetcher = portfolio();
        let report = BatchRunner::new(&fetcher, 400, IndicatorParams::default()).run(&[], |_| {}).await;
        assert_eq!(report, BatchReport::default());
    }

    #[test]
    fn stats_exclude_undefined_and_zero_gaps() {
        let stats = GapStats::from_records(&[
            record("A1", Some(4.0)),
            record("B1", Some(-2.0)),
            record("C1", Some(0.0)),
            record("D1", None),
        ]);
        assert_eq!(stats.with_gap, 3);
        assert_eq!(stats.above, 1);
        assert_eq!(stats.below, 1);
        assert!((stats.mean_gap_percent.unwrap() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn stats_without_any_gap() {
        let stats = GapStats::from_records(&[record("A1", None)]);
        assert_eq!(stats, GapStats::default());
    }
}
