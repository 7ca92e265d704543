//! Crawl coordinator - bucket-by-bucket orchestration
//!
//! The coordinator owns the rendering session and the crawl state for one
//! run. For each bucket the planner emits, it:
//! - Runs the listing enumerator over that bucket
//! - Merges the bucket's listings into the global set (first seen wins)
//! - Reports the bucket's result count back to the planner
//!
//! The run ends when the planner stops emitting buckets.

use crate::config::Config;
use crate::crawler::enumerator::ListingEnumerator;
use crate::crawler::planner::BucketPlanner;
use crate::listing::ListingSummary;
use crate::render::Renderer;
use crate::state::{BucketReport, CrawlState, StopReason};
use crate::SweepError;
use chrono::{DateTime, Utc};

/// Summary of a finished enumeration run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub buckets: Vec<BucketReport>,
    pub total_listings: usize,
}

impl CrawlReport {
    /// Buckets that ended at the step cap
    pub fn forced_stops(&self) -> usize {
        self.buckets
            .iter()
            .filter(|b| b.stop == StopReason::StepCap)
            .count()
    }

    /// Buckets whose search page could not be loaded
    pub fn failed_buckets(&self) -> usize {
        self.buckets
            .iter()
            .filter(|b| b.stop == StopReason::NavigationFailed)
            .count()
    }

    /// Buckets that did not run to their natural end
    pub fn unclean_buckets(&self) -> impl Iterator<Item = &BucketReport> {
        self.buckets.iter().filter(|b| !b.stop.is_clean())
    }
}

/// Main crawl coordinator structure
pub struct Coordinator<R: Renderer> {
    config: Config,
    renderer: R,
    state: CrawlState,
}

impl<R: Renderer> Coordinator<R> {
    /// Creates a coordinator with an empty crawl state
    pub fn new(config: Config, renderer: R) -> Self {
        Self {
            config,
            renderer,
            state: CrawlState::new(),
        }
    }

    /// Runs the bucket loop until the planner stops
    ///
    /// A bucket whose page fails to load is logged, reported as
    /// `NavigationFailed`, and counted as empty.
    pub async fn run(&mut self) -> Result<CrawlReport, SweepError> {
        let started_at = Utc::now();
        let mut planner = BucketPlanner::new(&self.config.search);

        while let Some(bucket) = planner.next_bucket() {
            let scan = ListingEnumerator::new(
                &mut self.renderer,
                &self.config.search,
                &self.config.enumerator,
            )
            .scan(bucket)
            .await;

            let (listings, rounds, stop) = match scan {
                Ok(scan) => (scan.listings, scan.rounds, scan.stop),
                Err(e) => {
                    tracing::error!("Bucket {} failed: {}", bucket, e);
                    (Default::default(), 0, StopReason::NavigationFailed)
                }
            };

            let found = listings.len();
            let new = self.state.merge_bucket(listings);

            tracing::info!(
                "=== Bucket summary {}: {} unique in bucket, {} new globally, {} total unique so far ===",
                bucket,
                found,
                new,
                self.state.len()
            );

            self.state.record_bucket(BucketReport {
                bucket,
                found,
                new,
                rounds,
                stop,
            });

            planner.record(found);
            if planner.hit_empty_streak() {
                tracing::info!(
                    "{} empty buckets in a row; assuming no listings at higher prices",
                    planner.empty_in_a_row()
                );
            }
        }

        let report = CrawlReport {
            started_at,
            finished_at: Utc::now(),
            buckets: self.state.buckets().to_vec(),
            total_listings: self.state.len(),
        };

        tracing::info!(
            "Enumeration complete: {} unique listings across {} buckets",
            report.total_listings,
            report.buckets.len()
        );

        Ok(report)
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    /// Consumes the coordinator, returning the session and listings ordered by id
    pub fn finish(self) -> (R, Vec<ListingSummary>) {
        (self.renderer, self.state.into_listings())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnumeratorConfig, SearchConfig};
    use crate::listing::Bucket;
    use crate::render::{ScriptedCard, ScriptedRenderer};

    fn create_test_config() -> Config {
        Config {
            search: SearchConfig {
                base_url: "https://listings.test/search/apa".to_string(),
                ..SearchConfig::default()
            },
            enumerator: EnumeratorConfig {
                settle_delay_ms: 0,
                ..EnumeratorConfig::default()
            },
            ..Config::default()
        }
    }

    fn url_for(config: &Config, min: u32, max: u32) -> String {
        config
            .search
            .bucket_url(&Bucket::new(min, max))
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_halts_after_two_empty_buckets() {
        let config = create_test_config();
        let renderer = ScriptedRenderer::new().with_page(
            url_for(&config, 600, 800),
            vec![vec![ScriptedCard::listing("A", Some(700))]],
        );

        let mut coordinator = Coordinator::new(config, renderer);
        let report = coordinator.run().await.unwrap();

        assert_eq!(report.buckets.len(), 3);
        assert_eq!(report.buckets[0].found, 1);
        assert_eq!(report.buckets[1].stop, StopReason::NoResults);
        assert_eq!(report.buckets[2].stop, StopReason::NoResults);
        assert_eq!(report.total_listings, 1);

        let (renderer, listings) = coordinator.finish();
        assert_eq!(renderer.navigations().len(), 3);
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].id, "A");
    }

    #[tokio::test]
    async fn test_global_set_is_union_of_buckets() {
        let config = create_test_config();
        // "dup" renders in two windows with no price, so both scans record it
        let renderer = ScriptedRenderer::new()
            .with_page(
                url_for(&config, 600, 800),
                vec![vec![
                    ScriptedCard::listing("a", Some(650)),
                    ScriptedCard::listing("dup", None),
                ]],
            )
            .with_page(
                url_for(&config, 800, 1000),
                vec![vec![
                    ScriptedCard::listing("b", Some(900)),
                    ScriptedCard::listing("dup", None),
                ]],
            );

        let mut coordinator = Coordinator::new(config, renderer);
        let report = coordinator.run().await.unwrap();

        assert_eq!(report.buckets[0].new, 2);
        assert_eq!(report.buckets[1].found, 2);
        assert_eq!(report.buckets[1].new, 1);

        let (_, listings) = coordinator.finish();
        let ids: Vec<&str> = listings.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "dup"]);
    }

    #[tokio::test]
    async fn test_navigation_failure_counts_as_empty() {
        let config = create_test_config();
        let renderer = ScriptedRenderer::new()
            .with_failing_navigation(url_for(&config, 600, 800))
            .with_failing_navigation(url_for(&config, 800, 1000));

        let mut coordinator = Coordinator::new(config, renderer);
        let report = coordinator.run().await.unwrap();

        assert_eq!(report.buckets.len(), 2);
        assert_eq!(report.failed_buckets(), 2);
        assert_eq!(report.unclean_buckets().count(), 2);
        assert!(coordinator.state().is_empty());
    }

    #[tokio::test]
    async fn test_stops_at_price_ceiling() {
        let mut config = create_test_config();
        config.search.max_price = 1000;
        let renderer = ScriptedRenderer::new()
            .with_page(
                url_for(&config, 600, 800),
                vec![vec![ScriptedCard::listing("a", Some(700))]],
            )
            .with_page(
                url_for(&config, 800, 1000),
                vec![vec![ScriptedCard::listing("b", Some(900))]],
            );

        let mut coordinator = Coordinator::new(config, renderer);
        let report = coordinator.run().await.unwrap();

        assert_eq!(report.buckets.len(), 2);
        assert_eq!(report.total_listings, 2);
        assert_eq!(report.forced_stops(), 0);
        assert_eq!(report.unclean_buckets().count(), 0);
    }
}
