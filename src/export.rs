// =============================================================================
// CSV export of summary records
// =============================================================================
//
// Column order is fixed; the MA and ATR headers carry the configured periods.
// Undefined values are written as empty cells; rows keep the order in which
// they were computed.

use anyhow::{Context, Result};

use crate::analysis::SummaryRecord;
use crate::indicators::IndicatorParams;

/// Header row, e.g. `Ticker,Current Price,150-Day MA,Gap %,ATR (14)`.
pub fn csv_header(params: IndicatorParams) -> [String; 5] {
    [
        "Ticker".to_string(),
        "Current Price".to_string(),
        format!("{}-Day MA", params.sma_period),
        "Gap %".to_string(),
        format!("ATR ({})", params.atr_period),
    ]
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Serialise `records` to CSV text.
pub fn records_to_csv(records: &[SummaryRecord], params: IndicatorParams) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(csv_header(params)).context("failed to write CSV header")?;

    for r in records {
        writer
            .write_record([
                r.ticker.clone(),
                r.current_price.to_string(),
                cell(r.sma),
                cell(r.gap_percent),
                cell(r.atr),
            ])
            .with_context(|| format!("failed to write CSV row for {}", r.ticker))?;
    }

    let bytes = writer.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_rows_in_order() {
        let records = vec![
            SummaryRecord {
                ticker: "MSFT".into(),
                current_price: 410.5,
                sma: Some(400.0),
                gap_percent: Some(2.625),
                atr: Some(6.25),
            },
            SummaryRecord {
                ticker: "IPO".into(),
                current_price: 12.0,
                sma: None,
                gap_percent: None,
                atr: None,
            },
        ];

        let csv = records_to_csv(&records, IndicatorParams::default()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Ticker,Current Price,150-Day MA,Gap %,ATR (14)");
        assert_eq!(lines[1], "MSFT,410.5,400,2.625,6.25");
        assert_eq!(lines[2], "IPO,12,,,");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn empty_export_is_header_only() {
        assert_eq!(records_to_csv(&[], IndicatorParams::default()).unwrap(), "Ticker,Current Price,150-Day MA,Gap %,ATR (14)\n");
    }

    #[test]
    fn header_follows_configured_periods() {
        let params = IndicatorParams {
            sma_period: 50,
            atr_period: 20,
        };
        let csv = records_to_csv(&[], params).unwrap();
        assert_eq!(csv, "Ticker,Current Price,50-Day MA,Gap %,ATR (20)\n");
    }
}
