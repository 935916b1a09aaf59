//! SQLite queries for finspot-server
//!
//! Every function takes any sqlx executor so the same query runs against the
//! pool for reads and inside a transaction for the record/undo writes.
//! Row helpers clamp stored integers into the engine's unsigned counters.

pub mod achievements;
pub mod progress;
pub mod sightings;
pub mod users;

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

/// Read a non-negative counter column as `u32`
pub(crate) fn counter(row: &SqliteRow, column: &str) -> Result<u32, sqlx::Error> {
    let value: i64 = row.try_get(column)?;
    Ok(value.clamp(0, i64::from(u32::MAX)) as u32)
}
