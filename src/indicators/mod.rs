// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free indicator math over an ordered price series.  Every
// series-valued function returns `Vec<Option<f64>>` aligned 1:1 with its input
// so callers are forced to handle positions where a window is not yet full.

pub mod atr;
pub mod sma;

use serde::Serialize;

use crate::market_data::PriceSeries;

/// Standard SMA window (sessions).
pub const DEFAULT_SMA_PERIOD: usize = 150;
/// Standard ATR window (sessions).
pub const DEFAULT_ATR_PERIOD: usize = 14;

/// Window sizes for one indicator pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorParams {
    pub sma_period: usize,
    pub atr_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            sma_period: DEFAULT_SMA_PERIOD,
            atr_period: DEFAULT_ATR_PERIOD,
        }
    }
}

/// SMA and ATR values aligned with the bars of a [`PriceSeries`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSeries {
    pub sma: Vec<Option<f64>>,
    pub atr: Vec<Option<f64>>,
}

impl IndicatorSeries {
    /// Compute both indicators over the full series.  A series shorter than a
    /// window leaves that indicator undefined everywhere; it is never an error.
    pub fn compute(series: &PriceSeries, params: IndicatorParams) -> Self {
        Self {
            sma: sma::calculate_sma(&series.closes(), params.sma_period),
            atr: atr::calculate_atr(series.bars(), params.atr_period),
        }
    }

    pub fn latest_sma(&self) -> Option<f64> {
        self.sma.last().copied().flatten()
    }

    pub fn latest_atr(&self) -> Option<f64> {
        self.atr.last().copied().flatten()
    }
}
