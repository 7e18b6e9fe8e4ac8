// =============================================================================
// Edited ticker list parsing
// =============================================================================
//
// Candidates are shown to the user joined with ", ".  After editing, the text
// is split on commas when it contains any, otherwise on newlines.  The edited
// list is authoritative: order is preserved and duplicates are kept.

/// Separator used when presenting extracted candidates for editing.
pub const DISPLAY_SEPARATOR: &str = ", ";

pub fn parse_ticker_list(text: &str) -> Vec<String> {
    let separator = if text.contains(',') { ',' } else { '\n' };
    text.split(separator)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_uppercase)
        .collect()
}

pub fn format_ticker_list(tickers: &[String]) -> String {
    tickers.join(DISPLAY_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_separated() {
        assert_eq!(parse_ticker_list(" aapl, MSFT ,,tsla "), vec!["AAPL", "MSFT", "TSLA"]);
    }

    #[test]
    fn newline_separated() {
        assert_eq!(parse_ticker_list("aapl\n\n msft \r\nnvda"), vec!["AAPL", "MSFT", "NVDA"]);
    }

    #[test]
    fn comma_wins_over_newline() {
        // Mixed input splits on commas only, so the newline stays inside an entry.
        assert_eq!(parse_ticker_list("AAPL\nMSFT, TSLA"), vec!["AAPL\nMSFT", "TSLA"]);
    }

    #[test]
    fn duplicates_are_kept() {
        assert_eq!(parse_ticker_list("AAPL, AAPL"), vec!["AAPL", "AAPL"]);
    }

    #[test]
    fn blank_input() {
        assert!(parse_ticker_list("  \n ").is_empty());
    }

    #[test]
    fn format_then_parse() {
        let tickers = vec!["AAPL".to_string(), "MSFT".to_string()];
        assert_eq!(format_ticker_list(&tickers), "AAPL, MSFT");
        assert_eq!(parse_ticker_list(&format_ticker_list(&tickers)), tickers);
    }
}
