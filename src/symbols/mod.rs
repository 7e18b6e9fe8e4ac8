// =============================================================================
// Ticker Symbols Module
// =============================================================================
//
// Free-text symbol extraction and parsing of the user-edited candidate list.

pub mod extractor;
pub mod ticker_list;

pub use extractor::{extract_tickers, extract_tickers_from_fragments};
pub use ticker_list::{format_ticker_list, parse_ticker_list};
