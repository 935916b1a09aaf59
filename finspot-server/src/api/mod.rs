//! HTTP API handlers for finspot-server

pub mod achievements;
pub mod health;
pub mod leaderboard;
pub mod sightings;
pub mod users;

pub use achievements::get_achievements;
pub use health::health_routes;
pub use leaderboard::get_leaderboard;
pub use sightings::{list_sightings, record_sighting, undo_sighting};
pub use users::{create_user, get_progress};
