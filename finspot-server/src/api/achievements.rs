//! Achievement board endpoint

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use finspot_common::progress::{
    achievement_board, find_achievement, AchievementBoard, CumulativeStats,
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

use super::users::load_stats;
use crate::error::ApiResult;
use crate::{db, AppState};

#[derive(Debug, Serialize)]
pub struct AchievementsResponse {
    pub user_id: String,
    pub stats: CumulativeStats,
    #[serde(flatten)]
    pub board: AchievementBoard,
}

/// GET /api/users/:user_id/achievements
pub async fn get_achievements(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<AchievementsResponse>> {
    let (user, stats) = load_stats(&state, &user_id).await?;
    let mut unlocked: HashMap<String, DateTime<Utc>> = HashMap::new();
    for row in db::achievements::list_unlocked(&state.db, &user.id).await? {
        if find_achievement(&row.achievement_id).is_none() {
            warn!(user_id = %user.id, achievement = %row.achievement_id, "Unlock for retired achievement");
            continue;
        }
        unlocked.insert(row.achievement_id, row.unlocked_at);
    }

    Ok(Json(AchievementsResponse {
        board: achievement_board(&stats, &unlocked),
        user_id: user.id,
        stats,
    }))
}
