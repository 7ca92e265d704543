//! Detail page parser
//!
//! This module extracts from a listing's detail page:
//! - Zip code (last token of the street address heading)
//! - Description (text of the posting body)
//! - Bathroom count (from the attribute summary)
//!
//! A structural mismatch yields `None` (or an empty description), never an error.

use crate::listing::ListingDetail;
use scraper::{Html, Selector};

const ADDRESS_SELECTOR: &str = "h2.street-address";
const BODY_SELECTOR: &str = "section[id*='postingbody']";
const ATTRIBUTE_SUMMARY_SELECTOR: &str = "span[class='attr important']";

/// Marker that follows the bathroom count in the attribute summary
const BATH_MARKER: &str = "Ba";

/// Parses a detail page into a `ListingDetail`
///
/// # Example
///
/// ```
/// use listing_sweep::crawler::parse_detail;
///
/// let html = r#"<h2 class="street-address">123 Main St, San Francisco, CA 94110</h2>"#;
/// let detail = parse_detail("https://example.org/1.html", html);
/// assert_eq!(detail.zip_code.as_deref(), Some("94110"));
/// ```
pub fn parse_detail(url: &str, html: &str) -> ListingDetail {
    let document = Html::parse_document(html);

    ListingDetail {
        url: url.to_string(),
        zip_code: extract_zip_code(&document),
        description: extract_description(&document),
        bathrooms: extract_bathrooms(&document),
    }
}

/// Takes the final whitespace-delimited token of the address heading
fn extract_zip_code(document: &Html) -> Option<String> {
    let selector = Selector::parse(ADDRESS_SELECTOR).ok()?;
    let heading = document.select(&selector).next()?;
    let text = heading.text().collect::<String>();
    text.split_whitespace().last().map(str::to_string)
}

/// Joins the non-empty text fragments of the posting body with newlines
fn extract_description(document: &Html) -> String {
    let Ok(selector) = Selector::parse(BODY_SELECTOR) else {
        return String::new();
    };

    document
        .select(&selector)
        .flat_map(|section| section.text())
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reads the digit immediately before the bath marker, if it is one
fn extract_bathrooms(document: &Html) -> Option<u32> {
    let selector = Selector::parse(ATTRIBUTE_SUMMARY_SELECTOR).ok()?;
    let summary = document.select(&selector).next()?;
    let text = summary.text().collect::<String>();
    let text = text.trim();

    let marker = text.find(BATH_MARKER)?;
    text[..marker].chars().last()?.to_digit(10)
}
