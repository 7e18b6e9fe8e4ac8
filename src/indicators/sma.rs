// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// Unweighted mean of the trailing `period` values:
//   SMA_i = (x_{i-period+1} + ... + x_i) / period
//
// The output is aligned 1:1 with the input.  Position i is `None` until a full
// window of defined values ends at i, so the first `period - 1` positions of a
// fully-defined input are always `None`.
// =============================================================================

/// Rolling mean over a sequence that may contain undefined positions.
///
/// A window that contains any `None` yields `None`.  Only the count of defined
/// values is carried forward; each full window is summed from its own values,
/// so rounding error never leaks from one window into the next.
pub fn rolling_mean(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let mut defined = 0usize;

    for i in 0..values.len() {
        if values[i].is_some() {
            defined += 1;
        }
        if i >= period && values[i - period].is_some() {
            defined -= 1;
        }
        if i + 1 >= period && defined == period {
            let sum: f64 = values[i + 1 - period..=i].iter().flatten().sum();
            out[i] = Some(sum / period as f64);
        }
    }

    out
}

/// SMA series of `closes` over `period` sessions.
pub fn calculate_sma(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let values: Vec<Option<f64>> = closes.iter().copied().map(Some).collect();
    rolling_mean(&values, period)
}
