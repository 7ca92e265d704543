//! Listing-Sweep: a bucketed rental-listing harvester
//!
//! This crate enumerates rental listings from a search view that renders its
//! results as a virtualized, infinite-scrolling list. The search space is cut
//! into price buckets, each bucket is scrolled until it stops yielding new
//! listing ids, and every listing's detail page is then fetched concurrently
//! and left-joined onto the summaries.

pub mod config;
pub mod crawler;
pub mod listing;
pub mod output;
pub mod render;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Listing-Sweep operations
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Renderer error: {0}")]
    Render(#[from] render::RenderError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Listing-Sweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use listing::{Bucket, ListingDetail, ListingSummary, MergedListing};
pub use state::{CrawlState, ScanState, StopReason};
