//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::listing::MergedListing;
use crate::storage::{RentalRecord, RunCounts, RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Records the final status and counts of a run
    fn finish_run(&mut self, run_id: i64, status: RunStatus, counts: RunCounts)
        -> StorageResult<()>;

    // ===== Rentals =====

    /// Upserts merged rows by post id, returning how many were written
    ///
    /// Rows without a price are skipped.
    fn insert_rentals(&mut self, rows: &[MergedListing]) -> StorageResult<usize>;

    /// Gets a rental by post id
    fn get_rental(&self, post_id: &str) -> StorageResult<Option<RentalRecord>>;

    /// Gets total rental count
    fn count_rentals(&self) -> StorageResult<u64>;
}
