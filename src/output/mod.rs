//! Output module for run results
//!
//! This module handles:
//! - Left-joining listing summaries with their details
//! - Exporting listings and merged rows as CSV
//! - Collecting and printing run statistics

mod export;
mod merge;
pub mod stats;

pub use export::{
    read_listings, write_listings, write_merged, write_rows, LISTING_COLUMNS, MERGED_COLUMNS,
};
pub use merge::merge_details;
pub use stats::{print_statistics, RunStatistics};
