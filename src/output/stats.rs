//! Run statistics
//!
//! This module collects the counts of one pipeline run and prints them in a
//! human-readable form once the run ends.

use crate::crawler::{CrawlReport, DetailBatch, FailureReason};
use std::collections::BTreeMap;

/// Summary of a finished pipeline run
#[derive(Debug, Clone, Default)]
pub struct RunStatistics {
    /// Enumeration report; `None` when listings were read from a file
    pub crawl: Option<CrawlReport>,

    /// Listings handed to the detail stage
    pub listings: usize,

    /// Detail pages parsed
    pub details: usize,

    /// Failed detail fetches, grouped by kind
    pub failures: BTreeMap<&'static str, usize>,

    /// Rows written to the merged file
    pub merged_rows: usize,

    /// Merged rows carrying detail fields
    pub rows_with_detail: usize,

    /// Rows loaded into the database, if a database was configured
    pub stored_rows: Option<usize>,
}

impl RunStatistics {
    /// Records the outcome of the detail stage
    pub fn record_details(&mut self, batch: &DetailBatch) {
        self.details = batch.details.len();
        self.failures.clear();
        for failure in &batch.failures {
            *self.failures.entry(failure_kind(&failure.reason)).or_insert(0) += 1;
        }
    }

    pub fn total_failures(&self) -> usize {
        self.failures.values().sum()
    }

    /// Share of listings that ended up with detail fields
    pub fn detail_coverage(&self) -> f64 {
        if self.merged_rows == 0 {
            0.0
        } else {
            (self.rows_with_detail as f64 / self.merged_rows as f64) * 100.0
        }
    }
}

fn failure_kind(reason: &FailureReason) -> &'static str {
    match reason {
        FailureReason::HttpStatus(_) => "http status",
        FailureReason::Network(_) => "network",
        FailureReason::Timeout => "timeout",
        FailureReason::Aborted => "aborted",
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &RunStatistics) {
    println!("=== Listing Sweep Summary ===\n");

    if let Some(crawl) = &stats.crawl {
        let elapsed = crawl.finished_at - crawl.started_at;
        println!("Enumeration:");
        println!("  Buckets scanned: {}", crawl.buckets.len());
        println!("  Unique listings: {}", crawl.total_listings);
        println!("  Duration: {}s", elapsed.num_seconds());

        let mut by_stop: BTreeMap<&str, usize> = BTreeMap::new();
        for bucket in &crawl.buckets {
            *by_stop.entry(bucket.stop.as_str()).or_insert(0) += 1;
        }
        for (stop, count) in by_stop {
            println!("  {}: {}", stop, count);
        }
        println!();

        let unclean: Vec<_> = crawl.unclean_buckets().collect();
        if !unclean.is_empty() {
            println!(
                "Buckets cut short ({} at the step cap, {} failed to load):",
                crawl.forced_stops(),
                crawl.failed_buckets()
            );
            for bucket in unclean {
                println!("  - {} {} ({} listings)", bucket.bucket, bucket.stop, bucket.found);
            }
            println!();
        }
    }

    println!("Details:");
    println!("  Listings: {}", stats.listings);
    println!("  Parsed: {}", stats.details);
    println!("  Failed: {}", stats.total_failures());
    for (kind, count) in &stats.failures {
        println!("    {}: {}", kind, count);
    }
    println!();

    println!("Output:");
    println!(
        "  Merged rows: {} ({:.1}% with detail)",
        stats.merged_rows,
        stats.detail_coverage()
    );
    if let Some(stored) = stats.stored_rows {
        println!("  Rows loaded into database: {}", stored);
    }
}
