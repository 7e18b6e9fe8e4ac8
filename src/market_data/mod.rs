pub mod fetcher;
pub mod price_series;

// Re-export for convenient access (e.g. `use crate::market_data::PriceSeries`).
pub use fetcher::QuoteFetcher;
pub use price_series::{PriceBar, PriceSeries, Quote, QuoteMetadata};
