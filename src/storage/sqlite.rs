//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::listing::MergedListing;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RentalRecord, RunCounts, RunRecord, RunStatus};
use crate::SweepError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(SweepError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, SweepError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, SweepError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Returns the first run of five consecutive digits in `raw`
///
/// Detail pages carry whatever token ends the address line, which is not
/// always a zip code; anything without a five-digit run becomes `None`.
pub fn clean_zip_code(raw: &str) -> Option<String> {
    raw.as_bytes()
        .windows(5)
        .position(|window| window.iter().all(u8::is_ascii_digit))
        .map(|start| raw[start..start + 5].to_string())
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?).unwrap_or(RunStatus::Failed),
        counts: RunCounts {
            listings_found: row.get::<_, i64>(5)? as usize,
            details_fetched: row.get::<_, i64>(6)? as usize,
            rows_loaded: row.get::<_, i64>(7)? as usize,
        },
    })
}

const RUN_COLUMNS: &str =
    "id, started_at, finished_at, config_hash, status, listings_found, details_fetched, rows_loaded";

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS))?;

        stmt.query_row(params![run_id], run_from_row)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM runs ORDER BY id DESC LIMIT 1",
            RUN_COLUMNS
        ))?;

        Ok(stmt.query_row([], run_from_row).optional()?)
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        counts: RunCounts,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, listings_found = ?3,
             details_fetched = ?4, rows_loaded = ?5 WHERE id = ?6",
            params![
                status.to_db_string(),
                now,
                counts.listings_found as i64,
                counts.details_fetched as i64,
                counts.rows_loaded as i64,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Rentals =====

    fn insert_rentals(&mut self, rows: &[MergedListing]) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;
        let mut written = 0;

        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO rentals (
                    post_id, price, bedrooms, bathrooms, sqft,
                    zip_code, neighborhood, full_description
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;

            for row in rows {
                let Some(price) = row.price else {
                    tracing::debug!("Skipping {} with no price", row.id);
                    continue;
                };

                stmt.execute(params![
                    row.id,
                    price,
                    row.bedrooms.map(f64::from),
                    row.bathrooms.map(f64::from),
                    row.square_feet,
                    row.zip_code.as_deref().and_then(clean_zip_code),
                    row.neighborhood,
                    row.description,
                ])?;
                written += 1;
            }
        }

        tx.commit()?;
        tracing::info!("Loaded {} of {} rows into rentals", written, rows.len());
        Ok(written)
    }

    fn get_rental(&self, post_id: &str) -> StorageResult<Option<RentalRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT post_id, price, bedrooms, bathrooms, sqft, zip_code, neighborhood,
             full_description, scraped_date FROM rentals WHERE post_id = ?1",
        )?;

        let rental = stmt
            .query_row(params![post_id], |row| {
                Ok(RentalRecord {
                    post_id: row.get(0)?,
                    price: row.get(1)?,
                    bedrooms: row.get(2)?,
                    bathrooms: row.get(3)?,
                    sqft: row.get(4)?,
                    zip_code: row.get(5)?,
                    neighborhood: row.get(6)?,
                    full_description: row.get(7)?,
                    scraped_date: row.get(8)?,
                })
            })
            .optional()?;

        Ok(rental)
    }

    fn count_rentals(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM rentals", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
