//! Sighting endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use finspot_common::db::SightingRecord;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::pagination::{calculate_pagination, PAGE_SIZE};
use crate::services::{self, NewSighting, RecordOutcome, UndoOutcome};
use crate::{db, AppState};

#[derive(Debug, Deserialize)]
pub struct RecordSightingRequest {
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

impl From<RecordSightingRequest> for NewSighting {
    fn from(req: RecordSightingRequest) -> Self {
        NewSighting {
            fish_id: req.fish_id,
            fish_name: req.fish_name,
            rarity: req.rarity,
            verification_confidence: req.verification_confidence,
            photo_quality: req.photo_quality,
            latitude: req.latitude,
            longitude: req.longitude,
            image_url: req.image_url,
            region: req.region,
            occurred_at: req.occurred_at,
        }
    }
}

/// POST /api/users/:user_id/sightings
pub async fn record_sighting(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<RecordSightingRequest>,
) -> ApiResult<(StatusCode, Json<RecordOutcome>)> {
    let outcome =
        services::record_sighting(&state.db, &state.user_locks, &user_id, req.into()).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// DELETE /api/users/:user_id/sightings/:sighting_id
pub async fn undo_sighting(
    State(state): State<AppState>,
    Path((user_id, sighting_id)): Path<(String, String)>,
) -> ApiResult<Json<UndoOutcome>> {
    let outcome =
        services::undo_sighting(&state.db, &state.user_locks, &user_id, &sighting_id).await?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

#[derive(Debug, Serialize)]
pub struct SightingListResponse {
    pub user_id: String,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub sightings: Vec<SightingRecord>,
}

/// GET /api/users/:user_id/sightings?page=N
pub async fn list_sightings(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<SightingListResponse>> {
    if db::users::get_user(&state.db, &user_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("User not found: {}", user_id)));
    }

    let total = db::sightings::count_user_sightings(&state.db, &user_id).await?;
    let pagination = calculate_pagination(total, params.page);
    let sightings =
        db::sightings::list_user_sightings(&state.db, &user_id, PAGE_SIZE, pagination.offset)
            .await?;

    Ok(Json(SightingListResponse {
        user_id,
        total,
        page: pagination.page,
        page_size: PAGE_SIZE,
        total_pages: pagination.total_pages,
        sightings,
    }))
}
