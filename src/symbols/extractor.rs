// =============================================================================
// Ticker Symbol Extractor
// =============================================================================
//
// Turns unstructured text into an ordered list of candidate ticker symbols:
//
//   1. Upper-case the whole input.
//   2. Match `\b[A-Z]{1,5}\b`: a maximal run of 1-5 ASCII capitals with a
//      word boundary on both sides.  A longer run ("NASDAQ") yields nothing,
//      and neither does a run glued to digits or underscores ("AB12").
//   3. Drop stop-list words.
//   4. De-duplicate, keeping the first occurrence.
//
// The regex and the stop-list are compatibility contracts: changing either
// changes which symbols a given document produces.
// =============================================================================

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// Common short words and unit/file-type abbreviations that look like tickers.
pub const STOP_WORDS: [&str; 45] = [
    "A", "I", "AM", "AN", "AS", "AT", "BE", "BY", "DO", "GO", "HE", "IF", "IN", "IS", "IT", "ME",
    "MY", "NO", "OF", "OK", "ON", "OR", "SO", "TO", "UP", "US", "WE", "THE", "AND", "FOR", "ARE",
    "BUT", "NOT", "YOU", "ALL", "CAN", "HAD", "HER", "WAS", "ONE", "OUR", "OUT", "PDF", "USD",
    "EUR",
];

static TICKER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z]{1,5}\b").expect("ticker pattern is a valid regex"));

static STOP_LIST: Lazy<HashSet<&'static str>> = Lazy::new(|| STOP_WORDS.into_iter().collect());

/// Extract distinct candidate symbols from `text`, in first-seen order.
///
/// Never fails; empty or symbol-free input yields an empty list.
pub fn extract_tickers(text: &str) -> Vec<String> {
    let upper = text.to_uppercase();
    let candidates = TICKER_PATTERN
        .find_iter(&upper)
        .map(|m| m.as_str())
        .filter(|t| !STOP_LIST.contains(t));
    dedup_preserving_order(candidates)
}

/// Extract from each fragment independently, then merge the results keeping
/// first occurrence across all fragments.
pub fn extract_tickers_from_fragments<S: AsRef<str>>(fragments: &[S]) -> Vec<String> {
    let per_fragment: Vec<String> = fragments
        .iter()
        .flat_map(|f| extract_tickers(f.as_ref()))
        .collect();
    dedup_preserving_order(per_fragment.iter().map(String::as_str))
}

fn dedup_preserving_order<'a>(items: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        if seen.insert(item) {
            out.push(item.to_string());
        }
    }
    out
}
