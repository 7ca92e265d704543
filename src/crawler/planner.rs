//! Bucket planner
//!
//! Emits ascending, non-overlapping price buckets of a fixed width, starting
//! at the configured start price. Emission ends when the next bucket would
//! start at or above the ceiling, or when the caller has reported enough
//! consecutive empty buckets.

use crate::config::SearchConfig;
use crate::listing::Bucket;

/// Sequential bucket generator with an empty-streak stop rule
#[derive(Debug, Clone)]
pub struct BucketPlanner {
    next_min: u32,
    width: u32,
    ceiling: u32,
    empty_threshold: u32,
    empty_in_a_row: u32,
}

impl BucketPlanner {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            next_min: config.start_price,
            width: config.bucket_width,
            ceiling: config.max_price,
            empty_threshold: config.empty_bucket_threshold,
            empty_in_a_row: 0,
        }
    }

    /// Returns the next bucket, or `None` once planning has ended
    pub fn next_bucket(&mut self) -> Option<Bucket> {
        if self.is_exhausted() || self.width == 0 {
            return None;
        }
        let max = self.next_min.saturating_add(self.width);
        let bucket = Bucket::new(self.next_min, max);
        self.next_min = max;
        Some(bucket)
    }

    /// Feeds back the number of listings a bucket produced
    ///
    /// An empty bucket extends the streak wherever it occurs, including the
    /// very first bucket; any non-empty bucket resets it.
    pub fn record(&mut self, found: usize) {
        if found == 0 {
            self.empty_in_a_row += 1;
        } else {
            self.empty_in_a_row = 0;
        }
    }

    /// Returns true when the empty-bucket streak has ended planning
    pub fn hit_empty_streak(&self) -> bool {
        self.empty_in_a_row >= self.empty_threshold
    }

    /// Returns true when no further bucket will be emitted
    pub fn is_exhausted(&self) -> bool {
        self.hit_empty_streak() || self.next_min >= self.ceiling
    }

    pub fn empty_in_a_row(&self) -> u32 {
        self.empty_in_a_row
    }

    /// Lists every bucket the plan would emit if none came back empty
    pub fn full_plan(config: &SearchConfig) -> Vec<Bucket> {
        let mut planner = Self::new(config);
        let mut buckets = Vec::new();
        while let Some(bucket) = planner.next_bucket() {
            buckets.push(bucket);
        }
        buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(start: u32, width: u32, max: u32, threshold: u32) -> SearchConfig {
        SearchConfig {
            start_price: start,
            bucket_width: width,
            max_price: max,
            empty_bucket_threshold: threshold,
            ..SearchConfig::default()
        }
    }

    #[test]
    fn test_buckets_are_contiguous_and_ascending() {
        let plan = BucketPlanner::full_plan(&search(600, 200, 1400, 2));
        assert_eq!(
            plan,
            vec![
                Bucket::new(600, 800),
                Bucket::new(800, 1000),
                Bucket::new(1000, 1200),
                Bucket::new(1200, 1400),
            ]
        );
    }

    #[test]
    fn test_default_plan_covers_range() {
        let plan = BucketPlanner::full_plan(&SearchConfig::default());
        assert_eq!(plan.len(), 42);
        assert_eq!(plan.first(), Some(&Bucket::new(600, 800)));
        assert_eq!(plan.last(), Some(&Bucket::new(8800, 9000)));
    }

    #[test]
    fn test_last_bucket_may_cross_ceiling() {
        let plan = BucketPlanner::full_plan(&search(600, 300, 1000, 2));
        assert_eq!(plan, vec![Bucket::new(600, 900), Bucket::new(900, 1200)]);
    }

    #[test]
    fn test_stops_after_consecutive_empty_buckets() {
        let mut planner = BucketPlanner::new(&search(600, 200, 9000, 2));

        assert!(planner.next_bucket().is_some());
        planner.record(5);
        assert!(planner.next_bucket().is_some());
        planner.record(0);
        assert!(planner.next_bucket().is_some());
        planner.record(0);

        assert!(planner.hit_empty_streak());
        assert!(planner.next_bucket().is_none());
    }

    #[test]
    fn test_non_empty_bucket_resets_streak() {
        let mut planner = BucketPlanner::new(&search(600, 200, 9000, 2));

        planner.next_bucket();
        planner.record(0);
        planner.next_bucket();
        planner.record(3);
        planner.next_bucket();
        planner.record(0);

        assert_eq!(planner.empty_in_a_row(), 1);
        assert!(planner.next_bucket().is_some());
    }

    #[test]
    fn test_first_bucket_empty_counts() {
        let mut planner = BucketPlanner::new(&search(600, 200, 9000, 1));
        planner.next_bucket();
        planner.record(0);
        assert!(planner.next_bucket().is_none());
    }
}
