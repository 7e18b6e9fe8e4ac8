// =============================================================================
// Runtime Configuration: analyzer settings loaded from JSON
// =============================================================================
//
// All fields carry `#[serde(default = "...")]` so that a partial (or empty)
// config file still loads; anything omitted falls back to the defaults below.
// Environment variables override the file for deployment-specific values.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::indicators::{IndicatorParams, DEFAULT_ATR_PERIOD, DEFAULT_SMA_PERIOD};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_sma_period() -> usize {
    DEFAULT_SMA_PERIOD
}

fn default_atr_period() -> usize {
    DEFAULT_ATR_PERIOD
}

/// Calendar days of history requested per ticker; enough for 150+ sessions.
fn default_lookback_days() -> u32 {
    400
}

fn default_quote_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

// =============================================================================
// RuntimeConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    // --- Indicators ---------------------------------------------------------

    /// Moving-average window in sessions.
    #[serde(default = "default_sma_period")]
    pub sma_period: usize,

    /// ATR window in sessions.
    #[serde(default = "default_atr_period")]
    pub atr_period: usize,

    // --- Quote provider ------------------------------------------------------

    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,

    /// Base URL of the chart API (overridable for tests and proxies).
    #[serde(default = "default_quote_base_url")]
    pub quote_base_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Back-adjust OHLC for splits and dividends using the adjusted close.
    #[serde(default = "default_true")]
    pub auto_adjust: bool,

    // --- API server -----------------------------------------------------------

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Largest accepted document upload.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            sma_period: default_sma_period(),
            atr_period: default_atr_period(),
            lookback_days: default_lookback_days(),
            quote_base_url: default_quote_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            auto_adjust: true,
            bind_addr: default_bind_addr(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing or unparsable file is an error so the caller can fall back
    /// to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            sma_period = config.sma_period,
            atr_period = config.atr_period,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Apply `ANALYZER_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("ANALYZER_BIND_ADDR").filter(|v| !v.trim().is_empty()) {
            self.bind_addr = addr.trim().to_string();
        }
        if let Some(url) = lookup("ANALYZER_QUOTE_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.quote_base_url = url.trim().trim_end_matches('/').to_string();
        }
    }

    pub fn indicator_params(&self) -> IndicatorParams {
        IndicatorParams {
            sma_period: self.sma_period,
            atr_period: self.atr_period,
        }
    }
}
