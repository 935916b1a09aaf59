//! Record and undo sightings
//!
//! Both operations hold the user's lock from the first read to the commit and
//! do all writes in one transaction, so a concurrent submission for the same
//! user always sees the committed stats.

use chrono::{DateTime, Utc};
use finspot_common::db::SightingRecord;
use finspot_common::progress::scoring::clamp_confidence;
use finspot_common::progress::{
    accumulate, check_new_achievements, is_verified_confidence, reduce_awarded, AchievementDefinition,
    ConfidenceBand, CumulativeStats, PhotoQuality, Rarity, SightingEvent,
};
use finspot_common::time;
use finspot_common::uuid_utils::new_record_id;
use serde::Serialize;
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::locks::UserLocks;

/// A sighting as submitted by a client, before scoring
#[derive(Debug, Clone, Default)]
pub struct NewSighting {
    pub fish_id: String,
    pub fish_name: Option<String>,
    pub rarity: String,
    pub verification_confidence: Option<f32>,
    pub photo_quality: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_url: Option<String>,
    pub region: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordOutcome {
    pub sighting: SightingRecord,
    pub stats: CumulativeStats,
    pub points_awarded: u32,
    pub xp_awarded: u32,
    pub confidence_band: ConfidenceBand,
    pub is_new_unique_species: bool,
    pub is_new_rare_unlock: bool,
    pub is_new_epic_unlock: bool,
    pub rank_changed: bool,
    pub new_achievements: Vec<&'static AchievementDefinition>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UndoOutcome {
    pub removed: SightingRecord,
    pub stats: CumulativeStats,
    pub was_last_of_species: bool,
}

/// Take the write lock up front
///
/// A deferred transaction that reads before writing fails with SQLITE_BUSY,
/// without waiting out the busy timeout, when another connection commits in
/// between.
async fn begin_write(pool: &SqlitePool) -> ApiResult<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Score a sighting and fold it into the user's progress
pub async fn record_sighting(
    pool: &SqlitePool,
    locks: &UserLocks,
    user_id: &str,
    input: NewSighting,
) -> ApiResult<RecordOutcome> {
    let fish_id = input.fish_id.trim().to_string();
    if fish_id.is_empty() {
        return Err(ApiError::BadRequest("fish_id must not be empty".to_string()));
    }

    let rarity = Rarity::from_str_lenient(&input.rarity);
    if rarity == Rarity::Unknown {
        warn!(user_id, rarity = %input.rarity, "Unrecognized rarity, scoring with defaults");
    }

    let photo_quality = match non_blank(input.photo_quality) {
        Some(raw) => {
            let parsed = PhotoQuality::from_str(&raw);
            if parsed.is_none() {
                warn!(user_id, photo_quality = %raw, "Unrecognized photo quality, no bonus");
            }
            parsed
        }
        None => None,
    };

    let confidence = clamp_confidence(input.verification_confidence.unwrap_or(0.0));
    let now = time::now();

    let _guard = locks.acquire(user_id).await;
    let mut tx = begin_write(pool).await?;

    if db::users::get_user(&mut *tx, user_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("User not found: {}", user_id)));
    }

    let prev = db::progress::get_progress(&mut *tx, user_id)
        .await?
        .unwrap_or_else(|| CumulativeStats::empty(now));
    let prior_of_species = db::sightings::count_user_fish(&mut *tx, user_id, &fish_id).await?;

    let event = SightingEvent {
        subject_id: fish_id.clone(),
        rarity,
        verified: is_verified_confidence(confidence),
        verification_confidence: confidence,
        photo_quality,
        occurred_at: input.occurred_at.unwrap_or(now),
        region: non_blank(input.region),
    };
    let outcome = accumulate(&prev, &event, prior_of_species == 0, now);

    let record = SightingRecord {
        id: new_record_id(),
        user_id: user_id.to_string(),
        fish_name: non_blank(input.fish_name).unwrap_or_else(|| fish_id.clone()),
        fish_id,
        rarity,
        latitude: input.latitude,
        longitude: input.longitude,
        image_url: non_blank(input.image_url),
        verified: event.verified,
        verification_confidence: confidence,
        photo_quality,
        points: outcome.points_delta,
        region: event.region.clone(),
        occurred_at: event.occurred_at,
        created_at: now,
    };
    db::sightings::insert_sighting(&mut *tx, &record).await?;
    db::progress::upsert_progress(&mut *tx, user_id, &outcome.stats).await?;

    let already: HashSet<String> = db::achievements::list_unlocked(&mut *tx, user_id)
        .await?
        .into_iter()
        .map(|u| u.achievement_id)
        .collect();
    let mut new_achievements = Vec::new();
    for achievement in check_new_achievements(&outcome.stats, &already) {
        if db::achievements::insert_unlock(&mut *tx, user_id, achievement, now).await? {
            new_achievements.push(achievement);
        }
    }

    tx.commit().await?;

    debug!(
        user_id,
        sighting_id = %record.id,
        fish_id = %record.fish_id,
        rarity = %rarity,
        verified = record.verified,
        points = outcome.points_delta,
        xp = outcome.xp_delta,
        "Recorded sighting"
    );
    if outcome.rank_changed {
        info!(user_id, from = %prev.rank, to = %outcome.stats.rank, "Rank changed");
    }
    for achievement in &new_achievements {
        info!(
            user_id,
            achievement = achievement.id,
            tier = achievement.tier.as_str(),
            "Achievement unlocked"
        );
    }

    Ok(RecordOutcome {
        stats: outcome.stats,
        points_awarded: outcome.points_delta,
        xp_awarded: outcome.xp_delta,
        confidence_band: ConfidenceBand::from_confidence(confidence),
        is_new_unique_species: outcome.is_new_unique_species,
        is_new_rare_unlock: outcome.is_new_rare_unlock,
        is_new_epic_unlock: outcome.is_new_epic_unlock,
        rank_changed: outcome.rank_changed,
        new_achievements,
        sighting: record,
    })
}

/// Remove a sighting and revert its contribution
///
/// Achievements unlocked by the sighting stay unlocked.
pub async fn undo_sighting(
    pool: &SqlitePool,
    locks: &UserLocks,
    user_id: &str,
    sighting_id: &str,
) -> ApiResult<UndoOutcome> {
    let now = time::now();

    let _guard = locks.acquire(user_id).await;
    let mut tx = begin_write(pool).await?;

    let record = db::sightings::get_sighting(&mut *tx, user_id, sighting_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Sighting not found: {}", sighting_id)))?;

    db::sightings::delete_sighting(&mut *tx, user_id, sighting_id).await?;
    let remaining = db::sightings::count_user_fish(&mut *tx, user_id, &record.fish_id).await?;
    let was_last_of_species = remaining == 0;

    let prev = match db::progress::get_progress(&mut *tx, user_id).await? {
        Some(stats) => stats,
        None => {
            warn!(user_id, sighting_id, "Sighting without progress row, reverting from zero");
            CumulativeStats::empty(now)
        }
    };
    let stats = reduce_awarded(&prev, &record.to_event(), record.points, was_last_of_species, now);
    db::progress::upsert_progress(&mut *tx, user_id, &stats).await?;

    tx.commit().await?;

    info!(
        user_id,
        sighting_id,
        fish_id = %record.fish_id,
        was_last_of_species,
        "Undid sighting"
    );
    if stats.rank != prev.rank {
        info!(user_id, from = %prev.rank, to = %stats.rank, "Rank changed");
    }

    Ok(UndoOutcome {
        removed: record,
        stats,
        was_last_of_species,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use finspot_common::db::init_memory_database;
    use finspot_common::progress::Rank;

    async fn setup() -> (SqlitePool, UserLocks) {
        let pool = init_memory_database().await.unwrap();
        db::users::insert_user(&pool, "diver", "Diver", Utc::now()).await.unwrap();
        (pool, UserLocks::new())
    }

    fn sighting(fish: &str, rarity: &str, confidence: f32, quality: Option<&str>) -> NewSighting {
        NewSighting {
            fish_id: fish.to_string(),
            rarity: rarity.to_string(),
            verification_confidence: Some(confidence),
            photo_quality: quality.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_first_epic_sighting() {
        let (pool, locks) = setup().await;
        let out = record_sighting(&pool, &locks, "diver", sighting("whale-shark", "epic", 0.9, Some("high")))
            .await
            .unwrap();

        // 100 * 1.5 + 20
        assert_eq!(out.points_awarded, 170);
        assert_eq!(out.xp_awarded, 75);
        assert!(out.sighting.verified);
        assert_eq!(out.sighting.fish_name, "whale-shark");
        assert_eq!(out.confidence_band, ConfidenceBand::High);
        assert!(out.is_new_unique_species && out.is_new_epic_unlock && !out.is_new_rare_unlock);
        assert_eq!(out.stats.epic_count, 1);
        let ids: Vec<&str> = out.new_achievements.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["FIRST_SIGHTING", "VERIFIED_SIGHTER", "EPIC_HUNTER"]);

        let stored = db::progress::get_progress(&pool, "diver").await.unwrap().unwrap();
        assert!(stored.same_counters(&out.stats));
    }

    #[tokio::test]
    async fn test_low_confidence_is_not_verified() {
        let (pool, locks) = setup().await;
        let out = record_sighting(&pool, &locks, "diver", sighting("cod", "COMMON", 0.64, None))
            .await
            .unwrap();
        assert!(!out.sighting.verified);
        assert_eq!(out.points_awarded, 10);
        assert_eq!(out.stats.verified_count, 0);
    }

    #[tokio::test]
    async fn test_repeat_species_is_not_new() {
        let (pool, locks) = setup().await;
        record_sighting(&pool, &locks, "diver", sighting("manta", "RARE", 0.0, None)).await.unwrap();
        let second = record_sighting(&pool, &locks, "diver", sighting("manta", "RARE", 0.0, None))
            .await
            .unwrap();

        assert!(!second.is_new_unique_species);
        assert!(!second.is_new_rare_unlock);
        assert_eq!(second.stats.total_sightings, 2);
        assert_eq!(second.stats.unique_species_count, 1);
        assert_eq!(second.stats.rare_count, 1);
        assert!(second.new_achievements.is_empty());
    }

    #[tokio::test]
    async fn test_rejects_blank_fish_and_unknown_user() {
        let (pool, locks) = setup().await;
        let blank = record_sighting(&pool, &locks, "diver", sighting("  ", "RARE", 0.0, None)).await;
        assert!(matches!(blank, Err(ApiError::BadRequest(_))));

        let missing = record_sighting(&pool, &locks, "ghost", sighting("cod", "RARE", 0.0, None)).await;
        assert!(matches!(missing, Err(ApiError::NotFound(_))));
        assert!(db::progress::get_progress(&pool, "ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_undo_reverts_stats_but_keeps_achievements() {
        let (pool, locks) = setup().await;
        let out = record_sighting(&pool, &locks, "diver", sighting("manta", "RARE", 0.8, Some("LOW")))
            .await
            .unwrap();
        assert_eq!(out.points_awarded, 80);

        let undone = undo_sighting(&pool, &locks, "diver", &out.sighting.id).await.unwrap();
        assert!(undone.was_last_of_species);
        assert!(undone.stats.same_counters(&CumulativeStats::default()));
        assert_eq!(undone.stats.rank, Rank::Beginner);

        let unlocked = db::achievements::list_unlocked(&pool, "diver").await.unwrap();
        assert!(unlocked.iter().any(|u| u.achievement_id == "RARE_HUNTER"));

        let again = undo_sighting(&pool, &locks, "diver", &out.sighting.id).await;
        assert!(matches!(again, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_undo_one_of_two_keeps_species() {
        let (pool, locks) = setup().await;
        let first = record_sighting(&pool, &locks, "diver", sighting("turtle", "EPIC", 0.0, None))
            .await
            .unwrap();
        record_sighting(&pool, &locks, "diver", sighting("turtle", "EPIC", 0.0, None)).await.unwrap();

        let undone = undo_sighting(&pool, &locks, "diver", &first.sighting.id).await.unwrap();
        assert!(!undone.was_last_of_species);
        assert_eq!(undone.stats.total_sightings, 1);
        assert_eq!(undone.stats.unique_species_count, 1);
        assert_eq!(undone.stats.epic_count, 1);
        assert_eq!(undone.stats.xp, 75);
    }

    #[tokio::test]
    async fn test_concurrent_records_do_not_lose_updates() {
        let (pool, locks) = setup().await;
        let mut handles = Vec::new();
        for i in 0..10 {
            let pool = pool.clone();
            let locks = locks.clone();
            handles.push(tokio::spawn(async move {
                record_sighting(&pool, &locks, "diver", sighting(&format!("fish-{}", i), "UNCOMMON", 0.0, None))
                    .await
                    .unwrap()
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let stats = db::progress::get_progress(&pool, "diver").await.unwrap().unwrap();
        assert_eq!(stats.total_sightings, 10);
        assert_eq!(stats.unique_species_count, 10);
        assert_eq!(stats.total_points, 250);
        assert_eq!(stats.xp, 150);
        assert_eq!(stats.rank, Rank::Intermediate);
    }

    #[tokio::test]
    async fn test_undo_takes_back_stored_award() {
        let (pool, locks) = setup().await;
        let out = record_sighting(&pool, &locks, "diver", sighting("whale-shark", "EPIC", 0.9, Some("HIGH")))
            .await
            .unwrap();
        record_sighting(&pool, &locks, "diver", sighting("cod", "COMMON", 0.0, None)).await.unwrap();

        // Award stored under an older scoring table
        sqlx::query("UPDATE user_sightings SET points = 150 WHERE id = ?")
            .bind(&out.sighting.id)
            .execute(&pool)
            .await
            .unwrap();

        let undone = undo_sighting(&pool, &locks, "diver", &out.sighting.id).await.unwrap();
        assert_eq!(undone.stats.total_points, 170 + 10 - 150);
    }

    #[tokio::test]
    async fn test_concurrent_writes_from_many_users_on_file_database() {
        let dir = tempfile::TempDir::new().unwrap();
        let pool = finspot_common::db::init_database(&dir.path().join("finspot.db"))
            .await
            .unwrap();
        let locks = UserLocks::new();
        for u in 0..8 {
            db::users::insert_user(&pool, &format!("diver-{}", u), "Diver", Utc::now())
                .await
                .unwrap();
        }

        let mut handles = Vec::new();
        for u in 0..8 {
            for i in 0..5 {
                let pool = pool.clone();
                let locks = locks.clone();
                handles.push(tokio::spawn(async move {
                    let user = format!("diver-{}", u);
                    let input = sighting(&format!("fish-{}", i), "RARE", 0.0, None);
                    record_sighting(&pool, &locks, &user, input).await
                }));
            }
        }

        let mut recorded = Vec::new();
        for h in handles {
            let result = h.await.unwrap();
            assert!(result.is_ok(), "record failed: {:?}", result.err());
            recorded.push(result.unwrap());
        }

        // Undo one per user, also concurrently
        let mut undos = Vec::new();
        for out in recorded.iter().filter(|o| o.sighting.fish_id == "fish-0") {
            let pool = pool.clone();
            let locks = locks.clone();
            let user = out.sighting.user_id.clone();
            let id = out.sighting.id.clone();
            undos.push(tokio::spawn(async move { undo_sighting(&pool, &locks, &user, &id).await }));
        }
        for h in undos {
            let result = h.await.unwrap();
            assert!(result.is_ok(), "undo failed: {:?}", result.err());
        }

        for u in 0..8 {
            let stats = db::progress::get_progress(&pool, &format!("diver-{}", u))
                .await
                .unwrap()
                .unwrap();
            assert_eq!(stats.total_sightings, 4);
            assert_eq!(stats.rare_count, 4);
            assert_eq!(stats.total_points, 200);
        }
    }
}
