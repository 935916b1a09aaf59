//! `user_sightings` table

use chrono::{DateTime, Utc};
use finspot_common::db::SightingRecord;
use finspot_common::progress::{AttributedSighting, PhotoQuality, Rarity};
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite};

use super::counter;

const SIGHTING_COLUMNS: &str = "id, user_id, fish_id, fish_name, rarity, latitude, longitude, \
     image_url, verified, verification_confidence, photo_quality, points, region, \
     occurred_at, created_at";

fn record_from_row(row: &SqliteRow) -> Result<SightingRecord, sqlx::Error> {
    let rarity: String = row.try_get("rarity")?;
    let photo_quality: Option<String> = row.try_get("photo_quality")?;
    let confidence: f64 = row.try_get("verification_confidence")?;

    Ok(SightingRecord {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        fish_id: row.try_get("fish_id")?,
        fish_name: row.try_get("fish_name")?,
        rarity: Rarity::from_str_lenient(&rarity),
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        image_url: row.try_get("image_url")?,
        verified: row.try_get("verified")?,
        verification_confidence: confidence as f32,
        photo_quality: photo_quality.as_deref().and_then(PhotoQuality::from_str),
        points: counter(row, "points")?,
        region: row.try_get("region")?,
        occurred_at: row.try_get("occurred_at")?,
        created_at: row.try_get("created_at")?,
    })
}

pub async fn insert_sighting<'e, E>(executor: E, record: &SightingRecord) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO user_sightings (
            id, user_id, fish_id, fish_name, rarity, latitude, longitude,
            image_url, verified, verification_confidence, photo_quality, points, region,
            occurred_at, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.id)
    .bind(&record.user_id)
    .bind(&record.fish_id)
    .bind(&record.fish_name)
    .bind(record.rarity.to_db_string())
    .bind(record.latitude)
    .bind(record.longitude)
    .bind(&record.image_url)
    .bind(record.verified)
    .bind(f64::from(record.verification_confidence))
    .bind(record.photo_quality.map(|q| q.to_db_string()))
    .bind(i64::from(record.points))
    .bind(&record.region)
    .bind(record.occurred_at)
    .bind(record.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// A sighting owned by `user_id`
pub async fn get_sighting<'e, E>(
    executor: E,
    user_id: &str,
    sighting_id: &str,
) -> Result<Option<SightingRecord>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {} FROM user_sightings WHERE id = ? AND user_id = ?",
        SIGHTING_COLUMNS
    );
    let row = sqlx::query(&sql)
        .bind(sighting_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

    row.as_ref().map(record_from_row).transpose()
}

/// Returns `false` when nothing was deleted
pub async fn delete_sighting<'e, E>(
    executor: E,
    user_id: &str,
    sighting_id: &str,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM user_sightings WHERE id = ? AND user_id = ?")
        .bind(sighting_id)
        .bind(user_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// How many sightings of `fish_id` the user has on record
pub async fn count_user_fish<'e, E>(executor: E, user_id: &str, fish_id: &str) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM user_sightings WHERE user_id = ? AND fish_id = ?")
        .bind(user_id)
        .bind(fish_id)
        .fetch_one(executor)
        .await
}

pub async fn count_user_sightings<'e, E>(executor: E, user_id: &str) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM user_sightings WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(executor)
        .await
}

/// One page of a user's sightings, newest first
pub async fn list_user_sightings<'e, E>(
    executor: E,
    user_id: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<SightingRecord>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {} FROM user_sightings WHERE user_id = ? \
         ORDER BY occurred_at DESC, created_at DESC, id DESC LIMIT ? OFFSET ?",
        SIGHTING_COLUMNS
    );
    let rows = sqlx::query(&sql)
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await?;

    rows.iter().map(record_from_row).collect()
}

/// Sightings of all users for the windowed leaderboard, oldest first
///
/// `since` and `region` narrow the scan; the leaderboard applies the same
/// filter again on the decoded events.
pub async fn list_attributed_sightings<'e, E>(
    executor: E,
    since: Option<DateTime<Utc>>,
    region: Option<&str>,
) -> Result<Vec<AttributedSighting>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        r#"
        SELECT s.id, s.user_id, s.fish_id, s.fish_name, s.rarity, s.latitude, s.longitude,
               s.image_url, s.verified, s.verification_confidence, s.photo_quality, s.points,
               s.region, s.occurred_at, s.created_at, u.name AS display_name
        FROM user_sightings s
        INNER JOIN users u ON u.id = s.user_id
        WHERE (? IS NULL OR s.occurred_at >= ?)
          AND (? IS NULL OR s.region = ?)
        ORDER BY s.occurred_at ASC, s.id ASC
        "#,
    )
    .bind(since)
    .bind(since)
    .bind(region)
    .bind(region)
    .fetch_all(executor)
    .await?;

    rows.iter()
        .map(|row| {
            let record = record_from_row(row)?;
            Ok(AttributedSighting {
                display_name: row.try_get("display_name")?,
                event: record.to_event(),
                user_id: record.user_id,
            })
        })
        .collect()
}
