//! `user_progress` table

use finspot_common::progress::{Contender, CumulativeStats, Rank};
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite};

use super::counter;

fn stats_from_row(row: &SqliteRow) -> Result<CumulativeStats, sqlx::Error> {
    let rank: String = row.try_get("rank")?;
    Ok(CumulativeStats {
        xp: counter(row, "xp")?,
        rank: Rank::from_str_lenient(&rank),
        total_points: counter(row, "total_points")?,
        total_sightings: counter(row, "total_sightings")?,
        unique_species_count: counter(row, "unique_species_count")?,
        rare_count: counter(row, "rare_count")?,
        epic_count: counter(row, "epic_count")?,
        verified_count: counter(row, "verified_count")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Stored stats, or `None` before the user's first sighting
pub async fn get_progress<'e, E>(
    executor: E,
    user_id: &str,
) -> Result<Option<CumulativeStats>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        r#"
        SELECT xp, rank, total_points, total_sightings, unique_species_count,
               rare_count, epic_count, verified_count, updated_at
        FROM user_progress
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    row.as_ref().map(stats_from_row).transpose()
}

pub async fn upsert_progress<'e, E>(
    executor: E,
    user_id: &str,
    stats: &CumulativeStats,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO user_progress (
            user_id, xp, rank, total_points, total_sightings, unique_species_count,
            rare_count, epic_count, verified_count, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            xp = excluded.xp,
            rank = excluded.rank,
            total_points = excluded.total_points,
            total_sightings = excluded.total_sightings,
            unique_species_count = excluded.unique_species_count,
            rare_count = excluded.rare_count,
            epic_count = excluded.epic_count,
            verified_count = excluded.verified_count,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(user_id)
    .bind(i64::from(stats.xp))
    .bind(stats.rank.as_str())
    .bind(i64::from(stats.total_points))
    .bind(i64::from(stats.total_sightings))
    .bind(i64::from(stats.unique_species_count))
    .bind(i64::from(stats.rare_count))
    .bind(i64::from(stats.epic_count))
    .bind(i64::from(stats.verified_count))
    .bind(stats.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Every user with a progress row, in registration order
///
/// Registration order is the leaderboard's tie-break.
pub async fn list_contenders<'e, E>(executor: E) -> Result<Vec<Contender>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        r#"
        SELECT u.id, u.name,
               p.xp, p.rank, p.total_points, p.total_sightings, p.unique_species_count,
               p.rare_count, p.epic_count, p.verified_count, p.updated_at
        FROM users u
        INNER JOIN user_progress p ON p.user_id = u.id
        ORDER BY u.created_at, u.id
        "#,
    )
    .fetch_all(executor)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(Contender {
                user_id: row.try_get("id")?,
                display_name: row.try_get("name")?,
                stats: stats_from_row(row)?,
            })
        })
        .collect()
}
