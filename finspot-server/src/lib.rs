//! finspot-server library - sighting tracker HTTP service
//!
//! Routes requests into the progress engine in `finspot-common` and persists
//! the results. Authentication happens upstream; the user id arrives as a
//! path parameter.

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod locks;
pub mod pagination;
pub mod services;

pub use error::{ApiError, ApiResult};
pub use locks::UserLocks;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// Serializes progress writes per user
    pub user_locks: UserLocks,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            user_locks: UserLocks::new(),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get, post};

    let routes = Router::new()
        .route("/api/users", post(api::create_user))
        .route("/api/users/:user_id/progress", get(api::get_progress))
        .route(
            "/api/users/:user_id/sightings",
            get(api::list_sightings).post(api::record_sighting),
        )
        .route(
            "/api/users/:user_id/sightings/:sighting_id",
            delete(api::undo_sighting),
        )
        .route("/api/users/:user_id/achievements", get(api::get_achievements))
        .route("/api/leaderboard", get(api::get_leaderboard));

    Router::new()
        .merge(routes)
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
