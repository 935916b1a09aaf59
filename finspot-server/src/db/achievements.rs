//! `user_achievements` table

use chrono::{DateTime, Utc};
use finspot_common::db::UnlockedAchievement;
use finspot_common::progress::AchievementDefinition;
use finspot_common::uuid_utils::new_record_id;
use sqlx::{Executor, Row, Sqlite};

/// Every unlock recorded for one user, oldest first
pub async fn list_unlocked<'e, E>(
    executor: E,
    user_id: &str,
) -> Result<Vec<UnlockedAchievement>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        r#"
        SELECT user_id, achievement_id, unlocked_at
        FROM user_achievements
        WHERE user_id = ?
        ORDER BY unlocked_at, achievement_id
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(UnlockedAchievement {
                user_id: row.try_get("user_id")?,
                achievement_id: row.try_get("achievement_id")?,
                unlocked_at: row.try_get("unlocked_at")?,
            })
        })
        .collect()
}

/// Record an unlock; a second grant of the same achievement is a no-op
///
/// Returns `true` when a row was written.
pub async fn insert_unlock<'e, E>(
    executor: E,
    user_id: &str,
    achievement: &AchievementDefinition,
    unlocked_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO user_achievements (
            id, user_id, achievement_id, achievement_name, achievement_tier, points, unlocked_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(new_record_id())
    .bind(user_id)
    .bind(achievement.id)
    .bind(achievement.name)
    .bind(achievement.tier.as_str())
    .bind(i64::from(achievement.points_award))
    .bind(unlocked_at)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::users::insert_user;
    use finspot_common::db::init_memory_database;
    use finspot_common::progress::find_achievement;

    #[tokio::test]
    async fn test_unlock_once() {
        let pool = init_memory_database().await.unwrap();
        let now = Utc::now();
        insert_user(&pool, "u1", "Marina", now).await.unwrap();
        let first = find_achievement("FIRST_SIGHTING").unwrap();

        assert!(insert_unlock(&pool, "u1", first, now).await.unwrap());
        assert!(!insert_unlock(&pool, "u1", first, now).await.unwrap());

        let unlocked = list_unlocked(&pool, "u1").await.unwrap();
        assert_eq!(
            unlocked,
            vec![UnlockedAchievement {
                user_id: "u1".to_string(),
                achievement_id: "FIRST_SIGHTING".to_string(),
                unlocked_at: now,
            }]
        );
        assert!(list_unlocked(&pool, "nobody").await.unwrap().is_empty());
    }
}
