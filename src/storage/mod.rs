//! Storage module for loading results into SQLite
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Run tracking (timestamps, config hash, counts, status)
//! - Upserting merged listings into the `rentals` table

mod schema;
mod sqlite;
mod traits;

pub use sqlite::{clean_zip_code, SqliteStorage};
pub use traits::{Storage, StorageError, StorageResult};

/// Represents a rental row in the database
#[derive(Debug, Clone, PartialEq)]
pub struct RentalRecord {
    pub post_id: String,
    pub price: i64,
    pub bedrooms: Option<f64>,
    pub bathrooms: Option<f64>,
    pub sqft: Option<i64>,
    pub zip_code: Option<String>,
    pub neighborhood: Option<String>,
    pub full_description: Option<String>,
    pub scraped_date: String,
}

/// Represents a pipeline run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub counts: RunCounts,
}

/// Row counts recorded when a run finishes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounts {
    pub listings_found: usize,
    pub details_fetched: usize,
    pub rows_loaded: usize,
}

/// Status of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
