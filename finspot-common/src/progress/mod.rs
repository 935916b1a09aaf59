//! Progress engine: scoring, rank, accumulation, achievements, leaderboards
//!
//! Pure and synchronous. The service layer fetches rows, calls into this
//! module, and persists what comes back; writes for one user must be
//! serialized by the caller so `prev` stats are never stale.

pub mod accumulator;
pub mod achievements;
pub mod leaderboard;
pub mod rank;
pub mod scoring;
pub mod types;

pub use accumulator::{accumulate, reduce, reduce_awarded, ProgressOutcome};
pub use achievements::{
    achievement_board, check_new_achievements, find_achievement, AchievementBoard,
    AchievementDefinition, AchievementStatus, AchievementSummary, Tier, CATALOG,
};
pub use leaderboard::{
    build_filtered_leaderboard, build_leaderboard, AttributedSighting, Contender,
    LeaderboardEntry, LeaderboardFilter, LeaderboardPeriod, DEFAULT_LEADERBOARD_LIMIT,
};
pub use rank::{classify_rank, Rank};
pub use scoring::{compute_points, is_verified_confidence, xp_for_rarity, ConfidenceBand};
pub use types::{CumulativeStats, PhotoQuality, Rarity, SightingEvent};
