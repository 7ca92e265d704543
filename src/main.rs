//! Listing-Sweep main entry point
//!
//! This is the command-line interface for the Listing-Sweep harvester.

use clap::Parser;
use listing_sweep::config::{load_config_with_hash, validate, Config};
use listing_sweep::crawler::{run_pipeline, BucketPlanner, PipelineOptions};
use listing_sweep::output::print_statistics;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Listing-Sweep: a bucketed rental-listing harvester
///
/// Listing-Sweep splits a rental search into price buckets, scrolls each
/// bucket's virtualized result list until no new listings appear, then
/// fetches every listing's detail page and writes the joined rows to CSV.
#[derive(Parser, Debug)]
#[command(name = "listing-sweep")]
#[command(version = "1.0.0")]
#[command(about = "A bucketed rental-listing harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the bucket plan without launching a browser
    #[arg(long)]
    dry_run: bool,

    /// Skip enumeration and read listings from this CSV
    #[arg(long, value_name = "PATH", conflicts_with = "dry_run")]
    from_listings: Option<PathBuf>,

    /// Write listings and merged rows without fetching detail pages
    #[arg(long, conflicts_with = "dry_run")]
    skip_details: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    (cfg, hash)
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => {
            tracing::info!("No configuration file given; using defaults");
            let config = Config::default();
            validate(&config)?;
            (config, "default".to_string())
        }
    };

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        let options = PipelineOptions {
            from_listings: cli.from_listings,
            skip_details: cli.skip_details,
        };
        handle_sweep(config, &config_hash, &options).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("listing_sweep=info,warn"),
            1 => EnvFilter::new("listing_sweep=debug,info"),
            2 => EnvFilter::new("listing_sweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and prints the bucket plan
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Listing-Sweep Dry Run ===\n");

    println!("Search:");
    println!("  Base URL: {}", config.search.base_url);
    println!(
        "  Prices: ${} to ${} in ${} buckets",
        config.search.start_price, config.search.max_price, config.search.bucket_width
    );
    println!(
        "  Stop after {} empty buckets in a row",
        config.search.empty_bucket_threshold
    );

    println!("\nEnumerator:");
    println!(
        "  First result timeout: {}ms",
        config.enumerator.first_result_timeout_ms
    );
    println!(
        "  Stop after {} rounds with no new ids (cap {} rounds)",
        config.enumerator.no_new_id_threshold, config.enumerator.max_steps
    );
    println!(
        "  Scroll {}px, settle {}ms",
        config.enumerator.scroll_delta_px, config.enumerator.settle_delay_ms
    );

    println!("\nDetails:");
    println!("  Workers: {}", config.details.worker_cap());
    println!("  Request timeout: {}s", config.details.request_timeout_secs);
    println!("  User agents: {}", config.details.user_agents.len());

    println!("\nOutput:");
    println!("  Listings: {}", config.output.listings_path);
    println!("  Merged: {}", config.output.merged_path);
    if let Some(database_path) = &config.output.database_path {
        println!("  Database: {}", database_path);
    }

    let plan = BucketPlanner::full_plan(&config.search);
    println!("\nBucket Plan ({}):", plan.len());
    for bucket in &plan {
        println!("  - {} {}", bucket, config.search.bucket_url(bucket)?);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would scan up to {} buckets", plan.len());

    Ok(())
}

/// Handles the main pipeline run
async fn handle_sweep(
    config: Config,
    config_hash: &str,
    options: &PipelineOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = &options.from_listings {
        tracing::info!("Reading listings from {}", path.display());
    } else {
        tracing::info!(
            "Starting sweep of {} from ${} to ${}",
            config.search.base_url,
            config.search.start_price,
            config.search.max_price
        );
    }

    match run_pipeline(config, config_hash, options).await {
        Ok(stats) => {
            tracing::info!("Sweep completed successfully");
            print_statistics(&stats);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Sweep failed: {}", e);
            Err(e.into())
        }
    }
}
