// =============================================================================
// Analysis Module
// =============================================================================
//
// Composes fetched quotes and indicator output into the records the
// presentation layer consumes: per-ticker summaries, the single-ticker detail
// view, and sequential batch reports.

pub mod batch;
pub mod detail;
pub mod summary;

pub use batch::{BatchReport, BatchRunner};
pub use detail::ticker_detail;
pub use summary::SummaryRecord;
