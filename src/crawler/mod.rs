//! Crawler module for listing enumeration and detail fetching
//!
//! This module contains the core pipeline logic, including:
//! - Price bucket planning
//! - Scroll-and-diff enumeration of a rendered result list
//! - Bucket-by-bucket crawl coordination
//! - Concurrent detail page fetching and parsing
//!
//! `run_pipeline` chains these stages with the output layer.

mod coordinator;
mod enumerator;
mod fetcher;
mod parser;
mod planner;

pub use coordinator::{Coordinator, CrawlReport};
pub use enumerator::{BucketScan, ListingEnumerator, RESULT_SELECTOR, SCROLL_ROOT_SELECTORS};
pub use fetcher::{
    build_http_client, fetch_detail, DetailBatch, DetailFetcher, FailureReason, FetchFailure,
};
pub use parser::parse_detail;
pub use planner::BucketPlanner;

use crate::config::Config;
use crate::listing::ListingSummary;
use crate::output::{merge_details, read_listings, write_listings, write_merged, RunStatistics};
use crate::render::{ChromeRenderer, Renderer};
use crate::storage::{RunCounts, RunStatus, SqliteStorage, Storage};
use crate::SweepError;
use std::path::{Path, PathBuf};

/// Knobs for a pipeline run that come from the command line
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Read listings from this CSV instead of crawling
    pub from_listings: Option<PathBuf>,

    /// Stop after the listings file; merged rows carry no detail fields
    pub skip_details: bool,
}

/// Runs a complete pipeline
///
/// This is the main entry point for a run. It will:
/// 1. Enumerate listings with a Chrome session (or read them from a file)
/// 2. Write the listings CSV
/// 3. Fetch and parse every listing's detail page
/// 4. Left-join details onto listings and write the merged CSV
/// 5. Load merged rows into SQLite, if a database is configured
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `config_hash` - Hash of the configuration file, recorded with the run
/// * `options` - Command line options
///
/// # Returns
///
/// * `Ok(RunStatistics)` - Run completed
/// * `Err(SweepError)` - A stage failed as a whole
pub async fn run_pipeline(
    config: Config,
    config_hash: &str,
    options: &PipelineOptions,
) -> Result<RunStatistics, SweepError> {
    let mut stats = RunStatistics::default();

    let listings = match &options.from_listings {
        Some(path) => read_listings(path)?,
        None => {
            tracing::info!("Launching browser (headless: {})", config.browser.headless);
            let renderer = ChromeRenderer::launch(&config.browser).await?;
            let (renderer, listings, report) = enumerate_listings(&config, renderer).await?;
            if let Err(e) = renderer.close().await {
                tracing::warn!("Browser did not shut down cleanly: {}", e);
            }
            stats.crawl = Some(report);
            listings
        }
    };

    process_listings(&config, config_hash, listings, options.skip_details, stats).await
}

/// Runs the bucket crawl with `renderer` and writes the listings CSV
///
/// The renderer is handed back so the caller decides how to shut it down.
pub async fn enumerate_listings<R: Renderer>(
    config: &Config,
    renderer: R,
) -> Result<(R, Vec<ListingSummary>, CrawlReport), SweepError> {
    let mut coordinator = Coordinator::new(config.clone(), renderer);
    let report = coordinator.run().await?;
    let (renderer, listings) = coordinator.finish();

    write_listings(Path::new(&config.output.listings_path), &listings)?;

    Ok((renderer, listings, report))
}

/// Fetches details for `listings`, merges, exports and optionally loads them
pub async fn process_listings(
    config: &Config,
    config_hash: &str,
    listings: Vec<ListingSummary>,
    skip_details: bool,
    mut stats: RunStatistics,
) -> Result<RunStatistics, SweepError> {
    stats.listings = listings.len();

    let details = if skip_details {
        tracing::info!("Skipping detail fetch");
        Vec::new()
    } else {
        let fetcher = DetailFetcher::new(&config.details)?;
        let batch = fetcher
            .fetch_all(listings.iter().map(|listing| listing.url.clone()))
            .await;
        stats.record_details(&batch);
        batch.details
    };

    let merged = merge_details(&listings, &details);
    stats.merged_rows = write_merged(Path::new(&config.output.merged_path), &merged)?;
    stats.rows_with_detail = merged.iter().filter(|row| row.has_detail()).count();

    if let Some(database_path) = &config.output.database_path {
        let mut storage = SqliteStorage::new(Path::new(database_path))?;
        let run_id = storage.create_run(config_hash)?;

        let loaded = storage.insert_rentals(&merged);
        let status = if loaded.is_ok() {
            RunStatus::Completed
        } else {
            RunStatus::Failed
        };
        let counts = RunCounts {
            listings_found: stats.listings,
            details_fetched: stats.details,
            rows_loaded: *loaded.as_ref().unwrap_or(&0),
        };
        storage.finish_run(run_id, status, counts)?;

        stats.stored_rows = Some(loaded?);
    }

    Ok(stats)
}
