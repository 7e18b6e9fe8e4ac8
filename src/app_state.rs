// =============================================================================
// Application State: shared collaborators for the API and CLI
// =============================================================================
//
// Holds configuration plus the two external boundaries (quote fetcher and
// document decoder) behind trait objects.  Nothing fetched is cached here:
// every request builds its price series fresh and drops it afterwards.
// =============================================================================

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::documents::{BuiltinDecoder, DocumentDecoder};
use crate::market_data::QuoteFetcher;
use crate::runtime_config::RuntimeConfig;
use crate::yahoo::YahooClient;

pub struct AppState {
    pub config: RuntimeConfig,
    pub fetcher: Arc<dyn QuoteFetcher>,
    pub decoder: Arc<dyn DocumentDecoder>,
    /// Instant when the process started. Used for uptime reporting.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: RuntimeConfig, fetcher: Arc<dyn QuoteFetcher>, decoder: Arc<dyn DocumentDecoder>) -> Self {
        Self {
            config,
            fetcher,
            decoder,
            start_time: Instant::now(),
        }
    }

    /// Production wiring: Yahoo chart client and the built-in decoder.
    pub fn from_config(config: RuntimeConfig) -> Result<Self> {
        let fetcher = YahooClient::new(
            config.quote_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
            config.auto_adjust,
        )?;
        Ok(Self::new(config, Arc::new(fetcher), Arc::new(BuiltinDecoder)))
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
