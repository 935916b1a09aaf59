//! Applying and reverting sightings against cumulative stats
//!
//! `accumulate` prices a sighting and folds it into a user's totals;
//! `reduce` is its exact inverse for undo. Both are pure: the caller supplies
//! the species-history facts (`is_new_unique_species`, `was_last_of_species`)
//! and the clock, and persists the result.
//!
//! Achievements are not touched here. An undo never revokes an achievement.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::rank::classify_rank;
use super::scoring::{compute_points, xp_for_rarity};
use super::types::{CumulativeStats, Rarity, SightingEvent};

/// Result of folding one sighting into cumulative stats
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressOutcome {
    pub stats: CumulativeStats,
    pub is_new_unique_species: bool,
    /// First-ever sighting of a rare species
    pub is_new_rare_unlock: bool,
    /// First-ever sighting of an epic species
    pub is_new_epic_unlock: bool,
    pub xp_delta: u32,
    pub points_delta: u32,
    pub rank_changed: bool,
}

/// Fold a sighting into `prev`
pub fn accumulate(
    prev: &CumulativeStats,
    event: &SightingEvent,
    is_new_unique_species: bool,
    now: DateTime<Utc>,
) -> ProgressOutcome {
    let xp_delta = xp_for_rarity(event.rarity);
    let points_delta = compute_points(event.rarity, event.verified, event.photo_quality);

    let is_new_rare_unlock = is_new_unique_species && event.rarity == Rarity::Rare;
    let is_new_epic_unlock = is_new_unique_species && event.rarity == Rarity::Epic;

    let xp = prev.xp.saturating_add(xp_delta);
    let stats = CumulativeStats {
        xp,
        rank: classify_rank(xp),
        total_points: prev.total_points.saturating_add(points_delta),
        total_sightings: prev.total_sightings.saturating_add(1),
        unique_species_count: prev.unique_species_count + u32::from(is_new_unique_species),
        rare_count: prev.rare_count + u32::from(is_new_rare_unlock),
        epic_count: prev.epic_count + u32::from(is_new_epic_unlock),
        verified_count: prev.verified_count + u32::from(event.verified),
        updated_at: now,
    };

    ProgressOutcome {
        rank_changed: stats.rank != prev.rank,
        stats,
        is_new_unique_species,
        is_new_rare_unlock,
        is_new_epic_unlock,
        xp_delta,
        points_delta,
    }
}

/// Revert a previously accumulated sighting
///
/// `was_last_of_species` is true when removing this sighting leaves the user
/// with no sightings of that subject. Every counter floors at zero.
pub fn reduce(
    prev: &CumulativeStats,
    event: &SightingEvent,
    was_last_of_species: bool,
    now: DateTime<Utc>,
) -> CumulativeStats {
    let points = compute_points(event.rarity, event.verified, event.photo_quality);
    reduce_awarded(prev, event, points, was_last_of_species, now)
}

/// [`reduce`] with the points actually awarded when the sighting was recorded
///
/// Stored sightings keep their award, so undo takes back exactly that amount
/// even if the scoring tables have changed since.
pub fn reduce_awarded(
    prev: &CumulativeStats,
    event: &SightingEvent,
    awarded_points: u32,
    was_last_of_species: bool,
    now: DateTime<Utc>,
) -> CumulativeStats {
    let xp_delta = xp_for_rarity(event.rarity);

    let drop_rare = was_last_of_species && event.rarity == Rarity::Rare;
    let drop_epic = was_last_of_species && event.rarity == Rarity::Epic;

    let xp = prev.xp.saturating_sub(xp_delta);
    CumulativeStats {
        xp,
        rank: classify_rank(xp),
        total_points: prev.total_points.saturating_sub(awarded_points),
        total_sightings: prev.total_sightings.saturating_sub(1),
        unique_species_count: prev
            .unique_species_count
            .saturating_sub(u32::from(was_last_of_species)),
        rare_count: prev.rare_count.saturating_sub(u32::from(drop_rare)),
        epic_count: prev.epic_count.saturating_sub(u32::from(drop_epic)),
        verified_count: prev.verified_count.saturating_sub(u32::from(event.verified)),
        updated_at: now,
    }
}
