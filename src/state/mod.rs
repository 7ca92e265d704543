//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `ScanState`: the per-bucket scroll loop state machine and its `StopReason`
//! - `CrawlState`: the global deduplicated listing set and per-bucket reports

mod crawl_state;
mod scan_state;

// Re-export main types
pub use crawl_state::{BucketReport, CrawlState};
pub use scan_state::{ScanState, StopReason};
