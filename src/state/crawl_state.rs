use crate::listing::{Bucket, ListingSummary};
use crate::state::StopReason;
use std::collections::{BTreeMap, HashMap};

/// Outcome of one bucket, as seen by the coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketReport {
    pub bucket: Bucket,

    /// Unique ids recorded by the bucket scan
    pub found: usize,

    /// Ids not previously in the global set
    pub new: usize,

    /// Scroll rounds performed
    pub rounds: u32,

    pub stop: StopReason,
}

/// Process-scoped crawl state
///
/// Owns the global `id -> ListingSummary` map. The first record seen for an
/// id is kept; later sightings from other buckets or rounds are ignored.
#[derive(Debug, Clone, Default)]
pub struct CrawlState {
    listings: BTreeMap<String, ListingSummary>,
    buckets: Vec<BucketReport>,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one bucket's listings, returning how many ids were new
    pub fn merge_bucket(&mut self, listings: HashMap<String, ListingSummary>) -> usize {
        let mut new = 0;
        for (id, listing) in listings {
            if let std::collections::btree_map::Entry::Vacant(entry) = self.listings.entry(id) {
                entry.insert(listing);
                new += 1;
            }
        }
        new
    }

    pub fn record_bucket(&mut self, report: BucketReport) {
        self.buckets.push(report);
    }

    pub fn get(&self, id: &str) -> Option<&ListingSummary> {
        self.listings.get(id)
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn buckets(&self) -> &[BucketReport] {
        &self.buckets
    }

    /// Consumes the state, returning listings ordered by id
    pub fn into_listings(self) -> Vec<ListingSummary> {
        self.listings.into_values().collect()
    }
}
