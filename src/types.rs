// =============================================================================
// Shared types used across the stock analyzer
// =============================================================================

use serde::{Deserialize, Serialize};

/// Where the current price sits relative to its moving average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Above,
    Below,
}

impl Trend {
    /// `Above` only when price is strictly greater than the average.
    pub fn classify(price: f64, average: f64) -> Self {
        if price > average {
            Self::Above
        } else {
            Self::Below
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Above => write!(f, "Above"),
            Self::Below => write!(f, "Below"),
        }
    }
}

/// Percentage deviation of `price` from `average`; `None` when the average
/// is undefined or zero.
pub fn gap_percent(price: f64, average: Option<f64>) -> Option<f64> {
    match average {
        Some(avg) if avg != 0.0 => Some((price - avg) / avg * 100.0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gap_sign_follows_price() {
        assert!(gap_percent(110.0, Some(100.0)).unwrap() > 0.0);
        assert!(gap_percent(90.0, Some(100.0)).unwrap() < 0.0);
        assert_eq!(gap_percent(100.0, Some(100.0)), Some(0.0));
    }

    #[test]
    fn gap_undefined_without_average() {
        assert_eq!(gap_percent(100.0, None), None);
        assert_eq!(gap_percent(100.0, Some(0.0)), None);
    }

    #[test]
    fn trend_classification() {
        assert_eq!(Trend::classify(101.0, 100.0), Trend::Above);
        assert_eq!(Trend::classify(100.0, 100.0), Trend::Below);
        assert_eq!(Trend::Above.to_string(), "Above");
    }
}
