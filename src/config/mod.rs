//! Configuration module for Listing-Sweep
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so an empty file is a valid configuration.
//!
//! # Example
//!
//! ```no_run
//! use listing_sweep::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sweep.toml")).unwrap();
//! println!("Buckets are {} wide", config.search.bucket_width);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    default_worker_cap, BrowserConfig, Config, DetailsConfig, EnumeratorConfig, OutputConfig,
    SearchConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
