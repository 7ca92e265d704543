use crate::listing::Bucket;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const DEFAULT_BASE_URL: &str = "https://sfbay.craigslist.org/search/san-francisco-ca/apa";

const DEFAULT_USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36",
];

/// Main configuration structure for Listing-Sweep
///
/// Every section is optional in the TOML file; missing sections and keys fall
/// back to the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub enumerator: EnumeratorConfig,
    #[serde(default)]
    pub details: DetailsConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Search view and price partitioning
///
/// Buckets assume a roughly uniform listing density: `bucket-width` must be
/// small enough that a single bucket stays under the search view's unstated
/// result cap.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Search page URL, without price parameters
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Lower bound of the first bucket
    #[serde(rename = "start-price")]
    pub start_price: u32,

    /// Width of every bucket
    #[serde(rename = "bucket-width")]
    pub bucket_width: u32,

    /// No bucket starts at or above this price
    #[serde(rename = "max-price")]
    pub max_price: u32,

    /// Consecutive empty buckets that end the crawl
    #[serde(rename = "empty-bucket-threshold")]
    pub empty_bucket_threshold: u32,
}

impl SearchConfig {
    /// Builds the search URL for one bucket
    ///
    /// The search view treats `max_price` as inclusive, so the upper bound is
    /// sent as `max - 1` to keep the window half-open.
    pub fn bucket_url(&self, bucket: &Bucket) -> Result<Url, url::ParseError> {
        let min = bucket.min_price.to_string();
        let max = bucket.max_price.saturating_sub(1).to_string();
        Url::parse_with_params(
            &self.base_url,
            &[("min_price", min.as_str()), ("max_price", max.as_str())],
        )
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            start_price: 600,
            bucket_width: 200,
            max_price: 9000,
            empty_bucket_threshold: 2,
        }
    }
}

/// Scroll-and-diff loop tuning
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnumeratorConfig {
    /// How long to wait for the first result node (milliseconds)
    #[serde(rename = "first-result-timeout-ms")]
    pub first_result_timeout_ms: u64,

    /// Consecutive rounds without a new id that end a bucket
    #[serde(rename = "no-new-id-threshold")]
    pub no_new_id_threshold: u32,

    /// Hard cap on scroll rounds per bucket
    #[serde(rename = "max-steps")]
    pub max_steps: u32,

    /// Pixels to advance the viewport per round
    #[serde(rename = "scroll-delta-px")]
    pub scroll_delta_px: u32,

    /// Delay after each scroll so the list can render the next slice (milliseconds)
    #[serde(rename = "settle-delay-ms")]
    pub settle_delay_ms: u64,
}

impl EnumeratorConfig {
    pub fn first_result_timeout(&self) -> Duration {
        Duration::from_millis(self.first_result_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Default for EnumeratorConfig {
    fn default() -> Self {
        Self {
            first_result_timeout_ms: 20_000,
            no_new_id_threshold: 3,
            max_steps: 300,
            scroll_delta_px: 1200,
            settle_delay_ms: 1200,
        }
    }
}

/// Detail page fetching
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetailsConfig {
    /// Worker cap; defaults to `min(32, available parallelism + 4)`
    #[serde(rename = "max-workers")]
    pub max_workers: Option<usize>,

    /// Per-task deadline covering request and body (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// User-Agent values picked at random per request
    #[serde(rename = "user-agents")]
    pub user_agents: Vec<String>,
}

impl DetailsConfig {
    /// Returns the configured worker cap or the parallelism-derived default
    pub fn worker_cap(&self) -> usize {
        self.max_workers.unwrap_or_else(default_worker_cap)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for DetailsConfig {
    fn default() -> Self {
        Self {
            max_workers: None,
            request_timeout_secs: 30,
            user_agents: DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect(),
        }
    }
}

/// `min(32, available parallelism + 4)`
pub fn default_worker_cap() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (cpus + 4).min(32)
}

/// Chrome session settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,

    #[serde(rename = "window-width")]
    pub window_width: u32,

    #[serde(rename = "window-height")]
    pub window_height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// CSV of listing summaries
    #[serde(rename = "listings-path")]
    pub listings_path: String,

    /// CSV of summaries joined with details
    #[serde(rename = "merged-path")]
    pub merged_path: String,

    /// SQLite database to load merged rows into, if any
    #[serde(rename = "database-path")]
    pub database_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            listings_path: "samples.csv".to_string(),
            merged_path: "merged.csv".to_string(),
            database_path: None,
        }
    }
}
