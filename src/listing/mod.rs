//! Listing data model
//!
//! - `Bucket`: a half-open price window `[min, max)`
//! - `ListingSummary`: what a search result card exposes, keyed by `id`
//! - `ListingDetail`: what a detail page exposes, keyed by `url`
//! - `MergedListing`: a summary with its detail fields attached (or null)

mod card;

pub use card::{
    parse_bedrooms, parse_card, parse_neighborhood, parse_price, parse_square_feet,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open price interval used to partition the search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bucket {
    pub min_price: u32,
    pub max_price: u32,
}

impl Bucket {
    pub fn new(min_price: u32, max_price: u32) -> Self {
        Self {
            min_price,
            max_price,
        }
    }

    /// Returns true if `price` lies in `[min, max)`
    pub fn contains(&self, price: u32) -> bool {
        price >= self.min_price && price < self.max_price
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}-${}", self.min_price, self.max_price)
    }
}

/// A listing as rendered in the search results
///
/// Field names follow the exported column names (`pid,url,price,beds,sqft,hood`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingSummary {
    #[serde(rename = "pid")]
    pub id: String,

    pub url: String,

    pub price: Option<u32>,

    #[serde(rename = "beds")]
    pub bedrooms: Option<u32>,

    #[serde(rename = "sqft")]
    pub square_feet: Option<u32>,

    #[serde(rename = "hood")]
    pub neighborhood: Option<String>,
}

/// Fields parsed from a listing's detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingDetail {
    /// The detail page URL this record was fetched from
    pub url: String,

    pub zip_code: Option<String>,

    /// Posting body text; empty when the page has no body section
    pub description: String,

    pub bathrooms: Option<u32>,
}

/// A summary left-joined with its detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedListing {
    #[serde(rename = "pid")]
    pub id: String,

    pub url: String,

    pub price: Option<u32>,

    #[serde(rename = "beds")]
    pub bedrooms: Option<u32>,

    #[serde(rename = "sqft")]
    pub square_feet: Option<u32>,

    #[serde(rename = "hood")]
    pub neighborhood: Option<String>,

    #[serde(rename = "zip code")]
    pub zip_code: Option<String>,

    pub description: Option<String>,

    pub bathrooms: Option<u32>,
}

impl MergedListing {
    /// Joins a summary with an optional detail record
    pub fn new(summary: &ListingSummary, detail: Option<&ListingDetail>) -> Self {
        Self {
            id: summary.id.clone(),
            url: summary.url.clone(),
            price: summary.price,
            bedrooms: summary.bedrooms,
            square_feet: summary.square_feet,
            neighborhood: summary.neighborhood.clone(),
            zip_code: detail.and_then(|d| d.zip_code.clone()),
            description: detail.map(|d| d.description.clone()),
            bathrooms: detail.and_then(|d| d.bathrooms),
        }
    }

    /// Returns true if detail fields were attached
    pub fn has_detail(&self) -> bool {
        self.description.is_some()
    }
}
