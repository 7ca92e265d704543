//! CSV export and import
//!
//! Headers are always written, so an empty result still produces a file a
//! downstream loader can read. Missing values are written as empty fields.

use crate::listing::{ListingSummary, MergedListing};
use crate::SweepError;
use serde::Serialize;
use std::io;
use std::path::Path;

/// Column order of the listings file
pub const LISTING_COLUMNS: [&str; 6] = ["pid", "url", "price", "beds", "sqft", "hood"];

/// Column order of the merged file
pub const MERGED_COLUMNS: [&str; 9] = [
    "pid",
    "url",
    "price",
    "beds",
    "sqft",
    "hood",
    "zip code",
    "description",
    "bathrooms",
];

/// Writes listing summaries to `path`, returning the number of rows
pub fn write_listings(path: &Path, listings: &[ListingSummary]) -> Result<usize, SweepError> {
    let file = std::fs::File::create(path)?;
    let rows = write_rows(file, &LISTING_COLUMNS, listings)?;
    tracing::info!("Wrote {} listings to {}", rows, path.display());
    Ok(rows)
}

/// Writes merged rows to `path`, returning the number of rows
pub fn write_merged(path: &Path, rows: &[MergedListing]) -> Result<usize, SweepError> {
    let file = std::fs::File::create(path)?;
    let written = write_rows(file, &MERGED_COLUMNS, rows)?;
    tracing::info!("Wrote {} merged rows to {}", written, path.display());
    Ok(written)
}

/// Serializes `rows` under an explicit header
pub fn write_rows<W, T>(writer: W, header: &[&str], rows: &[T]) -> Result<usize, SweepError>
where
    W: io::Write,
    T: Serialize,
{
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(header)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;

    Ok(rows.len())
}

/// Reads a listings file written by `write_listings`
pub fn read_listings(path: &Path) -> Result<Vec<ListingSummary>, SweepError> {
    let mut reader = csv::ReaderBuilder::new().from_path(path)?;
    let mut listings = Vec::new();

    for record in reader.deserialize() {
        let listing: ListingSummary = record?;
        listings.push(listing);
    }

    tracing::info!("Read {} listings from {}", listings.len(), path.display());
    Ok(listings)
}
