//! Leaderboard endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use finspot_common::progress::{
    build_filtered_leaderboard, build_leaderboard, LeaderboardEntry, LeaderboardFilter,
    LeaderboardPeriod, DEFAULT_LEADERBOARD_LIMIT,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiResult;
use crate::{db, AppState};

/// Upper bound on `limit`
pub const MAX_LEADERBOARD_LIMIT: usize = 1000;

#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardParams {
    pub period: Option<String>,
    pub region: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub period: LeaderboardPeriod,
    /// Region filter, or `"all"`
    pub region: String,
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// GET /api/leaderboard?period=all-time|weekly|monthly&region=R&limit=N
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> ApiResult<Json<LeaderboardResponse>> {
    let period = params
        .period
        .as_deref()
        .map(LeaderboardPeriod::from_str_lenient)
        .unwrap_or_default();
    let limit = params
        .limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .min(MAX_LEADERBOARD_LIMIT);
    let filter = LeaderboardFilter::new(period, params.region, Utc::now());

    let leaderboard = if filter.is_unfiltered() {
        let contenders = db::progress::list_contenders(&state.db).await?;
        build_leaderboard(&contenders, limit)
    } else {
        let sightings = db::sightings::list_attributed_sightings(
            &state.db,
            filter.since,
            filter.region.as_deref(),
        )
        .await?;
        build_filtered_leaderboard(&sightings, &filter, limit)
    };

    debug!(
        period = period.as_str(),
        region = ?filter.region,
        entries = leaderboard.len(),
        "Built leaderboard"
    );

    Ok(Json(LeaderboardResponse {
        period,
        region: filter.region.unwrap_or_else(|| "all".to_string()),
        leaderboard,
    }))
}
