//! Left join of listing summaries with detail records

use crate::listing::{ListingDetail, ListingSummary, MergedListing};
use std::collections::HashMap;

/// Joins summaries with details on `url`
///
/// Every summary yields exactly one row, in input order. Summaries with no
/// matching detail get null detail fields. If several details share a url
/// the first one wins.
pub fn merge_details(
    summaries: &[ListingSummary],
    details: &[ListingDetail],
) -> Vec<MergedListing> {
    let mut by_url: HashMap<&str, &ListingDetail> = HashMap::with_capacity(details.len());
    for detail in details {
        by_url.entry(detail.url.as_str()).or_insert(detail);
    }

    summaries
        .iter()
        .map(|summary| MergedListing::new(summary, by_url.get(summary.url.as_str()).copied()))
        .collect()
}
