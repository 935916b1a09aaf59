//! Database initialization
//!
//! Creates the SQLite file on first run, applies connection pragmas, creates
//! every table idempotently and then runs versioned migrations.

use crate::time::millis_to_duration;
use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// SQLite busy timeout applied to every connection
const BUSY_TIMEOUT_MS: u64 = 5000;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))?
        .create_if_missing(true)
        .foreign_keys(true)
        // WAL allows concurrent readers alongside the single writer
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(millis_to_duration(BUSY_TIMEOUT_MS));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;
    Ok(pool)
}

/// In-memory database with the full schema
///
/// Limited to one connection: every SQLite `:memory:` connection is its own
/// database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;
    Ok(pool)
}

/// Create all tables (idempotent) and run pending migrations
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;
    create_users_table(pool).await?;
    create_user_progress_table(pool).await?;
    create_user_sightings_table(pool).await?;
    create_user_achievements_table(pool).await?;

    crate::db::migrations::run_migrations(pool).await?;
    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// One row per user; absent until the first sighting is recorded
async fn create_user_progress_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_progress (
            user_id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
            xp INTEGER NOT NULL DEFAULT 0 CHECK (xp >= 0),
            rank TEXT NOT NULL DEFAULT 'Beginner',
            total_points INTEGER NOT NULL DEFAULT 0 CHECK (total_points >= 0),
            total_sightings INTEGER NOT NULL DEFAULT 0 CHECK (total_sightings >= 0),
            unique_species_count INTEGER NOT NULL DEFAULT 0 CHECK (unique_species_count >= 0),
            rare_count INTEGER NOT NULL DEFAULT 0 CHECK (rare_count >= 0),
            epic_count INTEGER NOT NULL DEFAULT 0 CHECK (epic_count >= 0),
            verified_count INTEGER NOT NULL DEFAULT 0 CHECK (verified_count >= 0),
            updated_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Baseline (v0) shape; `region` and the time index come from migrations
async fn create_user_sightings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_sightings (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            fish_id TEXT NOT NULL,
            fish_name TEXT NOT NULL,
            rarity TEXT NOT NULL,
            latitude REAL,
            longitude REAL,
            image_url TEXT,
            verified INTEGER NOT NULL DEFAULT 0,
            verification_confidence REAL NOT NULL DEFAULT 0,
            photo_quality TEXT,
            points INTEGER NOT NULL DEFAULT 0,
            occurred_at TIMESTAMP NOT NULL,
            created_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_user_sightings_user_fish ON user_sightings(user_id, fish_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Append-only; UNIQUE(user_id, achievement_id) makes a second grant a no-op
async fn create_user_achievements_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_achievements (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            achievement_id TEXT NOT NULL,
            achievement_name TEXT NOT NULL,
            achievement_tier TEXT NOT NULL,
            points INTEGER NOT NULL,
            unlocked_at TIMESTAMP NOT NULL,
            UNIQUE (user_id, achievement_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
