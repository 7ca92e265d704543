//! Detail page fetcher
//!
//! This module fetches listing detail pages concurrently:
//! - One shared `reqwest::Client` (connection reuse across tasks)
//! - A randomized `User-Agent` per request
//! - A worker cap enforced with a semaphore
//! - A per-task deadline, so a hung request becomes a reported failure
//!
//! Every failure is isolated to its own URL and reported alongside the
//! successful details; no failure aborts the batch.

use crate::config::DetailsConfig;
use crate::crawler::parser::parse_detail;
use crate::listing::ListingDetail;
use rand::seq::SliceRandom;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Why a detail fetch produced no record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The server answered with a non-success status
    HttpStatus(u16),

    /// Connection, TLS or body read failure
    Network(String),

    /// The per-task deadline elapsed
    Timeout,

    /// The task ended without reporting (panicked or cancelled)
    Aborted,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpStatus(code) => write!(f, "HTTP {}", code),
            Self::Network(message) => write!(f, "network error: {}", message),
            Self::Timeout => write!(f, "timed out"),
            Self::Aborted => write!(f, "task aborted"),
        }
    }
}

/// A URL whose detail could not be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub url: String,
    pub reason: FailureReason,
}

/// Outcome of a detail batch
///
/// Every distinct input URL appears exactly once, in either `details` or
/// `failures`. Order follows completion, not input.
#[derive(Debug, Clone, Default)]
pub struct DetailBatch {
    pub details: Vec<ListingDetail>,
    pub failures: Vec<FetchFailure>,
}

impl DetailBatch {
    /// Total records, successful or not
    pub fn len(&self) -> usize {
        self.details.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds the shared HTTP client for detail fetches
pub fn build_http_client(config: &DetailsConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(config.request_timeout())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches and parses one detail page
///
/// # Returns
///
/// * `Ok(ListingDetail)` - The page was fetched; fields that did not parse are `None`
/// * `Err(FailureReason)` - No usable response
pub async fn fetch_detail(
    client: &Client,
    url: &str,
    user_agent: &str,
) -> Result<ListingDetail, FailureReason> {
    let response = client
        .get(url)
        .header(USER_AGENT, user_agent)
        .send()
        .await
        .map_err(classify_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FailureReason::HttpStatus(status.as_u16()));
    }

    let body = response.text().await.map_err(classify_error)?;
    Ok(parse_detail(url, &body))
}

fn classify_error(error: reqwest::Error) -> FailureReason {
    if error.is_timeout() {
        FailureReason::Timeout
    } else {
        FailureReason::Network(error.to_string())
    }
}

/// Bounded concurrent fetcher over a set of detail URLs
pub struct DetailFetcher {
    client: Client,
    user_agents: Arc<Vec<String>>,
    max_workers: usize,
    task_timeout: Duration,
}

impl DetailFetcher {
    /// Creates a fetcher with its own client
    pub fn new(config: &DetailsConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config)?;
        Ok(Self::with_client(client, config))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, config: &DetailsConfig) -> Self {
        Self {
            client,
            user_agents: Arc::new(config.user_agents.clone()),
            max_workers: config.worker_cap().max(1),
            task_timeout: config.request_timeout(),
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Fetches every distinct URL, at most `max_workers` at a time
    pub async fn fetch_all<I>(&self, urls: I) -> DetailBatch
    where
        I: IntoIterator<Item = String>,
    {
        let mut pending: HashSet<String> = HashSet::new();
        let unique: Vec<String> = urls
            .into_iter()
            .filter(|url| pending.insert(url.clone()))
            .collect();
        let total = unique.len();

        tracing::info!(
            "Fetching {} detail pages with {} workers",
            total,
            self.max_workers
        );

        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut tasks = JoinSet::new();

        for url in unique {
            let semaphore = semaphore.clone();
            let client = self.client.clone();
            let user_agent = self.pick_user_agent();
            let deadline = self.task_timeout;

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let outcome =
                    match tokio::time::timeout(deadline, fetch_detail(&client, &url, &user_agent))
                        .await
                    {
                        Ok(outcome) => outcome,
                        Err(_) => Err(FailureReason::Timeout),
                    };
                (url, outcome)
            });
        }

        let mut batch = DetailBatch::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((url, Ok(detail))) => {
                    tracing::trace!("Fetched detail for {}", url);
                    pending.remove(&url);
                    batch.details.push(detail);
                }
                Ok((url, Err(reason))) => {
                    tracing::warn!("Detail fetch failed for {}: {}", url, reason);
                    pending.remove(&url);
                    batch.failures.push(FetchFailure { url, reason });
                }
                Err(e) => tracing::error!("Detail task ended abnormally: {}", e),
            }

            let done = batch.len();
            if done % 100 == 0 {
                tracing::info!("Progress: {}/{} detail pages", done, total);
            }
        }

        for url in pending {
            batch.failures.push(FetchFailure {
                url,
                reason: FailureReason::Aborted,
            });
        }

        tracing::info!(
            "Detail fetch complete: {} parsed, {} failed",
            batch.details.len(),
            batch.failures.len()
        );

        batch
    }

    fn pick_user_agent(&self) -> String {
        self.user_agents
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_default()
    }
}
