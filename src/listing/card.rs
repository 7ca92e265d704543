//! Search result card extraction
//!
//! A card is one rendered result node (`div[data-pid]`). Its markup is read
//! from the rendering session and parsed here. Every field except the detail
//! URL degrades to `None` when it is missing or malformed.

use crate::listing::ListingSummary;
use scraper::{ElementRef, Html, Selector};
use url::Url;

const ANCHOR_SELECTORS: [&str; 2] = ["a.cl-app-anchor[href]", "a[href]"];
const PRICE_SELECTOR: &str = "span[class*='price']";
const BEDROOMS_SELECTOR: &str = "span[class*='post-bedrooms']";
const SQFT_SELECTOR: &str = "span[class*='post-sqft']";
const META_SELECTOR: &str = "div[class*='meta']";

/// Parses one result card into a summary
///
/// # Arguments
///
/// * `id` - The card's `data-pid` value
/// * `html` - The card's outer markup
/// * `base_url` - The search page URL, for resolving relative links
///
/// # Returns
///
/// * `Some(ListingSummary)` - The card carried a usable detail link
/// * `None` - No detail link was found; the card cannot be joined later
pub fn parse_card(id: &str, html: &str, base_url: &Url) -> Option<ListingSummary> {
    let fragment = Html::parse_fragment(html);
    let root = fragment.root_element();

    let url = extract_detail_url(&root, base_url)?;

    Some(ListingSummary {
        id: id.to_string(),
        url,
        price: first_text(&root, PRICE_SELECTOR).and_then(|t| parse_price(&t)),
        bedrooms: first_text(&root, BEDROOMS_SELECTOR).and_then(|t| parse_bedrooms(&t)),
        square_feet: first_text(&root, SQFT_SELECTOR).and_then(|t| parse_square_feet(&t)),
        neighborhood: first_text(&root, META_SELECTOR).and_then(|t| parse_neighborhood(&t)),
    })
}

/// Parses a price label such as `$3,250`
pub fn parse_price(text: &str) -> Option<u32> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    cleaned.trim_start_matches('$').trim().parse().ok()
}

/// Takes the first digit of a bedroom label such as `2br`
pub fn parse_bedrooms(text: &str) -> Option<u32> {
    text.trim().chars().next()?.to_digit(10)
}

/// Parses a floor area label such as `850ft2`
pub fn parse_square_feet(text: &str) -> Option<u32> {
    let trimmed = text.trim();
    let number = trimmed
        .strip_suffix("ft2")
        .or_else(|| trimmed.strip_suffix("ft²"))
        .unwrap_or(trimmed);
    let cleaned: String = number.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse().ok()
}

/// Takes the last non-empty line of a metadata block
pub fn parse_neighborhood(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map(str::to_string)
}

/// Finds the first anchor, preferring the result's own app anchor
fn extract_detail_url(root: &ElementRef<'_>, base_url: &Url) -> Option<String> {
    ANCHOR_SELECTORS.iter().find_map(|selector| {
        let selector = Selector::parse(selector).ok()?;
        let href = root.select(&selector).next()?.value().attr("href")?;
        resolve_link(href, base_url)
    })
}

/// Resolves an href against the search page, keeping only HTTP(S) results
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute.to_string())
        }
        _ => None,
    }
}

/// Collects the text of the first element matching `selector`, one fragment per line
fn first_text(root: &ElementRef<'_>, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let element = root.select(&selector).next()?;
    Some(element.text().collect::<Vec<_>>().join("\n"))
}
