// =============================================================================
// Command Line Interface
// =============================================================================
//
// `serve` is the default when no subcommand is given. The other commands run
// once against the same collaborators the REST API uses and print to stdout.
// =============================================================================

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser, Subcommand};
use tracing::{info, warn};

use crate::analysis::{ticker_detail, BatchReport, BatchRunner, SummaryRecord};
use crate::app_state::AppState;
use crate::documents::extract_from_document;
use crate::export::records_to_csv;
use crate::indicators::IndicatorParams;
use crate::symbols::{format_ticker_list, parse_ticker_list};

#[derive(Parser)]
#[command(name = "stock-analyzer")]
#[command(about = "Moving-average gap and ATR screening for stock portfolios")]
pub struct Cli {
    /// Path to the JSON runtime configuration
    #[arg(long, global = true, default_value = "analyzer_config.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the REST API server
    Serve,

    /// Show the detail view for a single ticker
    Quote {
        /// Ticker symbol, case-insensitive
        ticker: String,
    },

    /// List ticker candidates found in a document
    Extract {
        /// Spreadsheet, PDF, Word or text file
        file: PathBuf,
    },

    /// Analyze a portfolio and print the summary table
    #[command(group(ArgGroup::new("source").required(true).args(["file", "tickers"])))]
    Analyze {
        /// Document to extract tickers from
        #[arg(long)]
        file: Option<PathBuf>,

        /// Comma or newline separated ticker list
        #[arg(long)]
        tickers: Option<String>,

        /// Write the results as CSV to this path
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

// =============================================================================
// quote
// =============================================================================

pub async fn run_quote(state: &AppState, raw: &str) -> Result<()> {
    let ticker = raw.trim().to_uppercase();
    if ticker.is_empty() {
        bail!("Enter a stock ticker symbol");
    }

    let detail = ticker_detail(
        state.fetcher.as_ref(),
        &ticker,
        state.config.lookback_days,
        state.config.indicator_params(),
    )
    .await?;

    let Some(d) = detail else {
        bail!("Could not find data for ticker '{ticker}'. Please check the symbol and try again.");
    };

    println!("{} ({})", d.name, d.ticker);
    println!("  Current price     {:.2}{}", d.current_price, signed_percent(d.day_change_percent, " "));
    println!("  {}-day MA        {}", state.config.sma_period, number(d.sma));
    println!("  Gap               {}", percent(d.gap_percent));
    match d.trend {
        Some(trend) => println!("  Trend             {trend} MA"),
        None => println!("  Trend             N/A"),
    }
    println!("  ATR ({})          {}{}", state.config.atr_period, number(d.atr), signed_percent(d.atr_percent_of_price, " of price "));
    println!("  52-week high      {}", number(d.fifty_two_week_high));
    println!("  52-week low       {}", number(d.fifty_two_week_low));
    println!("  Volume            {}", d.volume);
    match d.average_volume {
        Some(avg) => println!("  Avg volume        {avg:.0}"),
        None => println!("  Avg volume        N/A"),
    }
    Ok(())
}

// =============================================================================
// extract
// =============================================================================

pub fn run_extract(state: &AppState, file: &Path) -> Result<()> {
    let tickers = tickers_from_file(state, file)?;
    println!("{}", format_ticker_list(&tickers));
    Ok(())
}

fn tickers_from_file(state: &AppState, file: &Path) -> Result<Vec<String>> {
    let bytes = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let filename = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let extraction = extract_from_document(state.decoder.as_ref(), &filename, &bytes);
    if let Some(warning) = &extraction.warning {
        eprintln!("warning: {warning}");
    }
    Ok(extraction.tickers)
}

// =============================================================================
// analyze
// =============================================================================

pub async fn run_analyze(
    state: &AppState,
    file: Option<&Path>,
    tickers: Option<&str>,
    csv_out: Option<&Path>,
) -> Result<()> {
    let tickers = match (file, tickers) {
        (Some(path), _) => tickers_from_file(state, path)?,
        (None, Some(text)) => parse_ticker_list(text),
        (None, None) => Vec::new(),
    };
    if tickers.is_empty() {
        bail!("Please enter at least one ticker symbol.");
    }

    // First Ctrl-C stops the batch after the ticker in flight; a second one
    // exits without waiting for it.
    let cancel = Arc::new(AtomicBool::new(false));
    let watcher = {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            if watch_interrupts(&cancel, tokio::signal::ctrl_c).await {
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
        })
    };

    let report = BatchRunner::new(
        state.fetcher.as_ref(),
        state.config.lookback_days,
        state.config.indicator_params(),
    )
    .with_cancel(&cancel)
    .run(&tickers, |p| eprintln!("Fetching data for {} ({}/{})...", p.ticker, p.index + 1, p.total))
    .await;
    watcher.abort();

    print_report(&report, state.config.indicator_params());

    if let Some(path) = csv_out {
        let csv = records_to_csv(&report.succeeded, state.config.indicator_params())?;
        std::fs::write(path, csv).with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), rows = report.succeeded.len(), "CSV written");
    }
    Ok(())
}

/// Conventional exit status for a process stopped by SIGINT.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Sets `cancel` on the first interrupt.  Returns `true` when a second
/// interrupt arrives, meaning the caller should exit immediately.
async fn watch_interrupts<F, Fut>(cancel: &AtomicBool, mut next_interrupt: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if next_interrupt().await.is_err() {
        return false;
    }
    cancel.store(true, Ordering::Relaxed);
    eprintln!("Stopping after the current ticker (press Ctrl-C again to quit now)");

    next_interrupt().await.is_ok()
}

fn print_report(report: &BatchReport, params: IndicatorParams) {
    if report.cancelled {
        warn!("analysis cancelled, showing partial results");
    }
    if !report.failed.is_empty() {
        eprintln!("Could not fetch data for: {}", report.failed.join(", "));
    }
    if report.succeeded.is_empty() {
        println!("No data available for the given tickers.");
        return;
    }

    println!(
        "{:<8} {:>14} {:>12} {:>9} {:>10}",
        "Ticker",
        "Current Price",
        format!("{}-Day MA", params.sma_period),
        "Gap %",
        format!("ATR ({})", params.atr_period)
    );
    for r in &report.succeeded {
        print_row(r);
    }

    let stats = &report.stats;
    println!();
    println!("Above MA: {}   Below MA: {}   Average gap: {}", stats.above, stats.below, percent(stats.mean_gap_percent));
}

fn print_row(r: &SummaryRecord) {
    println!(
        "{:<8} {:>14.2} {:>12} {:>9} {:>10}",
        r.ticker,
        r.current_price,
        number(r.sma),
        percent(r.gap_percent),
        number(r.atr)
    );
}

fn number(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}"))
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:+.2}%"))
}

fn signed_percent(value: Option<f64>, prefix: &str) -> String {
    value.map_or_else(String::new, |v| format!("{prefix}({v:+.2}%)"))
}
