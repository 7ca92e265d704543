//! Listing enumerator - scroll-and-diff over one price bucket
//!
//! The search view only materializes the result nodes near the viewport, and
//! offers no pagination contract. For one bucket the enumerator:
//! 1. Loads the bucket's search URL
//! 2. Waits for the first result node (timeout means an empty bucket)
//! 3. Repeatedly reads the rendered nodes, records ids it has not seen, and
//!    scrolls the result container (or the window) to render the next slice
//! 4. Stops after a run of rounds with no new id, or at the hard step cap

use crate::config::{EnumeratorConfig, SearchConfig};
use crate::listing::{parse_card, Bucket, ListingSummary};
use crate::render::Renderer;
use crate::state::{ScanState, StopReason};
use crate::SweepError;
use std::collections::{HashMap, HashSet};
use url::Url;

/// Selector for rendered result nodes
pub const RESULT_SELECTOR: &str = "div[data-pid]";

/// Candidate scrollable result containers, in order of preference
pub const SCROLL_ROOT_SELECTORS: [&str; 2] = ["#search-results", ".scrolling-container"];

/// Result of scanning one bucket
#[derive(Debug, Clone)]
pub struct BucketScan {
    pub bucket: Bucket,

    /// Unique listings recorded in this bucket, keyed by id
    pub listings: HashMap<String, ListingSummary>,

    /// Scroll rounds performed (zero when nothing rendered)
    pub rounds: u32,

    pub stop: StopReason,
}

impl BucketScan {
    fn empty(bucket: Bucket, stop: StopReason) -> Self {
        Self {
            bucket,
            listings: HashMap::new(),
            rounds: 0,
            stop,
        }
    }
}

/// Drives one rendering session through bucket scans
pub struct ListingEnumerator<'a, R: Renderer> {
    renderer: &'a mut R,
    search: &'a SearchConfig,
    settings: &'a EnumeratorConfig,
}

impl<'a, R: Renderer> ListingEnumerator<'a, R> {
    pub fn new(renderer: &'a mut R, search: &'a SearchConfig, settings: &'a EnumeratorConfig) -> Self {
        Self {
            renderer,
            search,
            settings,
        }
    }

    /// Scans one bucket to completion
    ///
    /// # Returns
    ///
    /// * `Ok(BucketScan)` - The bucket's listings and why the scan stopped
    /// * `Err(SweepError)` - The search URL could not be built or loaded
    pub async fn scan(&mut self, bucket: Bucket) -> Result<BucketScan, SweepError> {
        let url = self.search.bucket_url(&bucket)?;
        tracing::info!("=== Bucket {} ===", bucket);
        tracing::debug!("Loading: {}", url);

        self.renderer.navigate(url.as_str()).await?;

        let mut state = ScanState::AwaitingFirstResult;
        tracing::trace!("  {}", state);
        let rendered = self
            .renderer
            .wait_for(RESULT_SELECTOR, self.settings.first_result_timeout())
            .await?;

        if !rendered {
            tracing::info!("  No visible results for bucket {} (timed out)", bucket);
            return Ok(BucketScan::empty(bucket, StopReason::NoResults));
        }

        state = ScanState::Scrolling;
        tracing::debug!("  First results rendered; {}", state);

        let scroll_root = self.find_scroll_root().await;
        let mut listings: HashMap<String, ListingSummary> = HashMap::new();
        let mut out_of_window: HashSet<String> = HashSet::new();
        let mut idle_rounds = 0;
        let mut rounds = 0;

        for step in 0..self.settings.max_steps {
            let new_ids = self
                .read_round(&url, &bucket, &mut listings, &mut out_of_window)
                .await;
            rounds += 1;

            if new_ids == 0 {
                idle_rounds += 1;
            } else {
                idle_rounds = 0;
            }

            tracing::debug!(
                "  Step {:03} -> new ids this round: {}, bucket unique ids: {}",
                step,
                new_ids,
                listings.len()
            );

            state = state.after_round(
                idle_rounds,
                self.settings.no_new_id_threshold,
                step,
                self.settings.max_steps,
            );
            if state.is_terminal() {
                break;
            }

            self.advance(scroll_root.as_ref()).await;

            let settle = self.settings.settle_delay();
            if !settle.is_zero() {
                tokio::time::sleep(settle).await;
            }
        }

        let stop = match state {
            ScanState::Stopped(reason) => reason,
            _ => StopReason::StepCap,
        };

        if stop == StopReason::StepCap {
            tracing::warn!(
                "  Bucket {} hit the step cap ({}); keeping {} listings",
                bucket,
                self.settings.max_steps,
                listings.len()
            );
        }

        tracing::info!(
            "  Bucket {}: {} unique ids in {} rounds ({})",
            bucket,
            listings.len(),
            rounds,
            stop
        );

        Ok(BucketScan {
            bucket,
            listings,
            rounds,
            stop,
        })
    }

    /// Reads every rendered node once and records unseen ids
    ///
    /// Returns the number of ids recorded this round. Read failures on a
    /// single node skip that node; a failed query counts as an idle round.
    async fn read_round(
        &mut self,
        page_url: &Url,
        bucket: &Bucket,
        listings: &mut HashMap<String, ListingSummary>,
        out_of_window: &mut HashSet<String>,
    ) -> usize {
        let nodes = match self.renderer.find_elements(RESULT_SELECTOR).await {
            Ok(nodes) => nodes,
            Err(e) => {
                tracing::warn!("  Failed to read result nodes: {}", e);
                return 0;
            }
        };

        let mut new_ids = 0;
        for node in &nodes {
            let pid = match self.renderer.attribute(node, "data-pid").await {
                Ok(Some(pid)) if !pid.trim().is_empty() => pid.trim().to_string(),
                Ok(_) => continue,
                Err(e) => {
                    tracing::trace!("  Skipping unreadable node: {}", e);
                    continue;
                }
            };

            if listings.contains_key(&pid) || out_of_window.contains(&pid) {
                continue;
            }

            let markup = match self.renderer.outer_html(node).await {
                Ok(Some(markup)) => markup,
                Ok(None) => continue,
                Err(e) => {
                    tracing::trace!("  Skipping node {}: {}", pid, e);
                    continue;
                }
            };

            let Some(listing) = parse_card(&pid, &markup, page_url) else {
                tracing::debug!("  Result {} has no detail link yet", pid);
                continue;
            };

            if let Some(price) = listing.price {
                if !bucket.contains(price) {
                    tracing::debug!("  Result {} priced {} is outside {}", pid, price, bucket);
                    out_of_window.insert(pid);
                    continue;
                }
            }

            listings.insert(pid, listing);
            new_ids += 1;
        }

        new_ids
    }

    /// Picks the scrollable result container, if the page has one
    async fn find_scroll_root(&mut self) -> Option<R::Element> {
        for selector in SCROLL_ROOT_SELECTORS {
            match self.renderer.find_elements(selector).await {
                Ok(found) => {
                    if let Some(root) = found.into_iter().next() {
                        tracing::debug!("  Using {} as scroll root", selector);
                        return Some(root);
                    }
                }
                Err(e) => tracing::trace!("  Scroll root query {} failed: {}", selector, e),
            }
        }
        tracing::debug!("  Falling back to window scroll");
        None
    }

    /// Moves the viewport down by the configured delta
    async fn advance(&mut self, scroll_root: Option<&R::Element>) {
        let delta = self.settings.scroll_delta_px;
        let script = match scroll_root {
            Some(_) => format!(
                "function() {{ this.scrollTop = this.scrollTop + {}; }}",
                delta
            ),
            None => format!(
                "function() {{ window.scrollTo(0, window.pageYOffset + {}); }}",
                delta
            ),
        };

        if let Err(e) = self.renderer.execute(&script, scroll_root).await {
            tracing::warn!("  Scroll failed: {}", e);
        }
    }
}
