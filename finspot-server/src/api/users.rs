//! User registration and progress

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use finspot_common::db::User;
use finspot_common::progress::CumulativeStats;
use finspot_common::time;
use finspot_common::uuid_utils::new_record_id;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::{db, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Id issued by the upstream identity provider; generated when absent
    pub id: Option<String>,
    pub name: String,
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("name must not be empty".to_string()));
    }
    let id = match req.id.as_deref().map(str::trim) {
        Some("") => return Err(ApiError::BadRequest("id must not be empty".to_string())),
        Some(id) => id.to_string(),
        None => new_record_id(),
    };

    let user = User {
        id,
        name: name.to_string(),
        created_at: time::now(),
    };
    if !db::users::insert_user(&state.db, &user.id, &user.name, user.created_at).await? {
        return Err(ApiError::Conflict(format!("User already exists: {}", user.id)));
    }

    info!(user_id = %user.id, "Registered user");
    Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub user_id: String,
    pub display_name: String,
    #[serde(flatten)]
    pub stats: CumulativeStats,
    /// XP still needed for the next rank; absent at Master
    pub xp_to_next_rank: Option<u32>,
}

/// Stats for an existing user, zeroed before the first sighting
pub(crate) async fn load_stats(state: &AppState, user_id: &str) -> ApiResult<(User, CumulativeStats)> {
    let user = db::users::get_user(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User not found: {}", user_id)))?;
    let stats = db::progress::get_progress(&state.db, user_id)
        .await?
        .unwrap_or_else(|| CumulativeStats::empty(user.created_at));
    Ok((user, stats))
}

/// GET /api/users/:user_id/progress
pub async fn get_progress(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<ProgressResponse>> {
    let (user, stats) = load_stats(&state, &user_id).await?;

    let xp_to_next_rank = stats
        .rank
        .next()
        .map(|next| next.min_xp().saturating_sub(stats.xp));

    Ok(Json(ProgressResponse {
        user_id: user.id,
        display_name: user.name,
        stats,
        xp_to_next_rank,
    }))
}
