// =============================================================================
// Average True Range (ATR): simple rolling mean
// =============================================================================
//
// ATR measures volatility by decomposing the entire range of a session.
//
// True Range (TR) for session i >= 1:
//   TR_i = max(H_i - L_i, |H_i - C_{i-1}|, |L_i - C_{i-1}|)
// TR_0 is undefined (no previous close).
//
// ATR_i is the unweighted mean of the trailing `period` TR values, so it is
// undefined for the first `period` sessions of a series.
//
// Default period: 14
// =============================================================================

use super::sma::rolling_mean;
use crate::market_data::PriceBar;

/// True Range series aligned 1:1 with `bars`; index 0 is always `None`.
pub fn true_range(bars: &[PriceBar]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(bars.len());
    for i in 0..bars.len() {
        if i == 0 {
            out.push(None);
            continue;
        }
        let high = bars[i].high;
        let low = bars[i].low;
        let prev_close = bars[i - 1].close;

        let hl = high - low;
        let hc = (high - prev_close).abs();
        let lc = (low - prev_close).abs();

        out.push(Some(hl.max(hc).max(lc)));
    }
    out
}

/// ATR series aligned 1:1 with `bars`.
pub fn calculate_atr(bars: &[PriceBar], period: usize) -> Vec<Option<f64>> {
    rolling_mean(&true_range(bars), period)
}

/// ATR as a percentage of `price`; `None` for a non-positive price.
pub fn atr_percent_of_price(atr: f64, price: f64) -> Option<f64> {
    if price > 0.0 {
        Some(atr / price * 100.0)
    } else {
        None
    }
}
