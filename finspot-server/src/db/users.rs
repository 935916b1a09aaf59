//! `users` table

use chrono::{DateTime, Utc};
use finspot_common::db::User;
use sqlx::{Executor, Row, Sqlite};

/// Insert a user; returns `false` when the id is already registered
pub async fn insert_user<'e, E>(
    executor: E,
    id: &str,
    name: &str,
    created_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("INSERT OR IGNORE INTO users (id, name, created_at) VALUES (?, ?, ?)")
        .bind(id)
        .bind(name)
        .bind(created_at)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn get_user<'e, E>(executor: E, id: &str) -> Result<Option<User>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT id, name, created_at FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    row.map(|r| {
        Ok(User {
            id: r.try_get("id")?,
            name: r.try_get("name")?,
            created_at: r.try_get("created_at")?,
        })
    })
    .transpose()
}
