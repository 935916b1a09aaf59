//! Achievement catalog and unlock evaluation
//!
//! The catalog is a static table; each entry's requirement is a single
//! threshold over one cumulative counter. Evaluation is side-effect free:
//! callers persist the returned definitions as unlocks and add their
//! `points_award` to a separate achievement-points total.
//!
//! Unlocks are permanent. Nothing in this module (or in
//! [`crate::progress::reduce`]) ever takes one back.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::types::CumulativeStats;

/// Prestige classification of an achievement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Bronze => "BRONZE",
            Tier::Silver => "SILVER",
            Tier::Gold => "GOLD",
            Tier::Platinum => "PLATINUM",
        }
    }
}

/// Counter an achievement requirement is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatMetric {
    TotalSightings,
    UniqueSpecies,
    RareCount,
    EpicCount,
    VerifiedCount,
    TotalPoints,
}

impl StatMetric {
    pub fn read(&self, stats: &CumulativeStats) -> u32 {
        match self {
            StatMetric::TotalSightings => stats.total_sightings,
            StatMetric::UniqueSpecies => stats.unique_species_count,
            StatMetric::RareCount => stats.rare_count,
            StatMetric::EpicCount => stats.epic_count,
            StatMetric::VerifiedCount => stats.verified_count,
            StatMetric::TotalPoints => stats.total_points,
        }
    }
}

/// `metric >= threshold`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Requirement {
    pub metric: StatMetric,
    pub threshold: u32,
}

impl Requirement {
    const fn at_least(metric: StatMetric, threshold: u32) -> Self {
        Self { metric, threshold }
    }

    pub fn is_met(&self, stats: &CumulativeStats) -> bool {
        self.metric.read(stats) >= self.threshold
    }

    /// Percent of the way to the threshold, capped at 100
    pub fn progress_percent(&self, stats: &CumulativeStats) -> u8 {
        if self.threshold == 0 {
            return 100;
        }
        let current = u64::from(self.metric.read(stats));
        (current * 100 / u64::from(self.threshold)).min(100) as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AchievementDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub tier: Tier,
    pub points_award: u32,
    pub requirement: Requirement,
}

macro_rules! achievement {
    ($id:literal, $name:literal, $description:literal, $icon:literal, $tier:ident, $points:literal, $metric:ident >= $threshold:literal) => {
        AchievementDefinition {
            id: $id,
            name: $name,
            description: $description,
            icon: $icon,
            tier: Tier::$tier,
            points_award: $points,
            requirement: Requirement::at_least(StatMetric::$metric, $threshold),
        }
    };
}

/// Full achievement catalog, in display order
pub static CATALOG: &[AchievementDefinition] = &[
    // First steps
    achievement!("FIRST_SIGHTING", "First Catch", "Record your first fish sighting", "🎣", Bronze, 10, TotalSightings >= 1),
    achievement!("VERIFIED_SIGHTER", "Verified Sighter", "Get your first verified sighting", "✓", Bronze, 15, VerifiedCount >= 1),
    // Unique species
    achievement!("FISH_COLLECTOR_5", "Fish Collector", "Spot 5 unique fish species", "🐠", Bronze, 25, UniqueSpecies >= 5),
    achievement!("FISH_COLLECTOR_10", "Fish Expert", "Spot 10 unique fish species", "🐡", Silver, 50, UniqueSpecies >= 10),
    achievement!("FISH_COLLECTOR_25", "Fish Master", "Spot 25 unique fish species", "🦈", Gold, 100, UniqueSpecies >= 25),
    achievement!("FISH_COLLECTOR_50", "Marine Biologist", "Spot 50 unique fish species", "🐋", Platinum, 250, UniqueSpecies >= 50),
    // Rare and epic species
    achievement!("RARE_HUNTER", "Rare Hunter", "Spot your first rare fish", "⭐", Silver, 30, RareCount >= 1),
    achievement!("RARE_COLLECTOR", "Rare Collector", "Spot 5 rare fish", "🌟", Gold, 75, RareCount >= 5),
    achievement!("EPIC_HUNTER", "Epic Hunter", "Spot your first epic fish", "💎", Gold, 100, EpicCount >= 1),
    achievement!("EPIC_COLLECTOR", "Epic Collector", "Spot 3 epic fish", "👑", Platinum, 300, EpicCount >= 3),
    // Total sightings
    achievement!("DEDICATED_SPOTTER", "Dedicated Spotter", "Record 25 total sightings", "📸", Bronze, 30, TotalSightings >= 25),
    achievement!("KEEN_OBSERVER", "Keen Observer", "Record 50 total sightings", "📷", Silver, 60, TotalSightings >= 50),
    achievement!("MASTER_TRACKER", "Master Tracker", "Record 100 total sightings", "🎯", Gold, 150, TotalSightings >= 100),
    // Verification
    achievement!("TRUSTED_SPOTTER", "Trusted Spotter", "Get 10 verified sightings", "✅", Silver, 50, VerifiedCount >= 10),
    achievement!("VERIFICATION_MASTER", "Verification Master", "Get 25 verified sightings", "🏆", Gold, 125, VerifiedCount >= 25),
    // Points
    achievement!("POINTS_500", "Rising Star", "Earn 500 total points", "🌠", Silver, 50, TotalPoints >= 500),
    achievement!("POINTS_1000", "Point Master", "Earn 1,000 total points", "💫", Gold, 100, TotalPoints >= 1000),
    achievement!("POINTS_2500", "Legend", "Earn 2,500 total points", "🔱", Platinum, 250, TotalPoints >= 2500),
];

/// Look up a catalog entry by id
pub fn find_achievement(id: &str) -> Option<&'static AchievementDefinition> {
    CATALOG.iter().find(|a| a.id == id)
}

/// Catalog entries newly earned by `stats`
///
/// Returns, in catalog order, every definition whose requirement is met and
/// whose id is not in `already_unlocked`.
pub fn check_new_achievements(
    stats: &CumulativeStats,
    already_unlocked: &HashSet<String>,
) -> Vec<&'static AchievementDefinition> {
    CATALOG
        .iter()
        .filter(|a| !already_unlocked.contains(a.id) && a.requirement.is_met(stats))
        .collect()
}

/// One catalog entry as seen by a particular user
#[derive(Debug, Clone, Serialize)]
pub struct AchievementStatus {
    #[serde(flatten)]
    pub definition: &'static AchievementDefinition,
    pub unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
    pub current: u32,
    pub target: u32,
    pub progress: u8,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AchievementsByTier {
    #[serde(rename = "PLATINUM")]
    pub platinum: Vec<AchievementStatus>,
    #[serde(rename = "GOLD")]
    pub gold: Vec<AchievementStatus>,
    #[serde(rename = "SILVER")]
    pub silver: Vec<AchievementStatus>,
    #[serde(rename = "BRONZE")]
    pub bronze: Vec<AchievementStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AchievementSummary {
    pub total: usize,
    pub unlocked: usize,
    pub locked: usize,
    /// Sum of `points_award` over unlocked entries; separate from `total_points`
    pub achievement_points: u32,
}

/// Lock state of the whole catalog for one user
#[derive(Debug, Clone, Serialize)]
pub struct AchievementBoard {
    pub achievements: Vec<AchievementStatus>,
    pub by_tier: AchievementsByTier,
    pub summary: AchievementSummary,
}

/// Build the full catalog view for a user
///
/// `unlocked` maps achievement id to unlock time. Ids that are not in the
/// catalog (e.g. retired achievements) are ignored.
pub fn achievement_board(
    stats: &CumulativeStats,
    unlocked: &HashMap<String, DateTime<Utc>>,
) -> AchievementBoard {
    let achievements: Vec<AchievementStatus> = CATALOG
        .iter()
        .map(|definition| {
            let unlocked_at = unlocked.get(definition.id).copied();
            let is_unlocked = unlocked_at.is_some();
            let progress = if is_unlocked {
                100
            } else {
                definition.requirement.progress_percent(stats)
            };
            AchievementStatus {
                definition,
                unlocked: is_unlocked,
                unlocked_at,
                current: definition.requirement.metric.read(stats),
                target: definition.requirement.threshold,
                progress,
            }
        })
        .collect();

    let mut by_tier = AchievementsByTier::default();
    for status in &achievements {
        let bucket = match status.definition.tier {
            Tier::Platinum => &mut by_tier.platinum,
            Tier::Gold => &mut by_tier.gold,
            Tier::Silver => &mut by_tier.silver,
            Tier::Bronze => &mut by_tier.bronze,
        };
        bucket.push(status.clone());
    }

    let unlocked_count = achievements.iter().filter(|a| a.unlocked).count();
    let achievement_points = achievements
        .iter()
        .filter(|a| a.unlocked)
        .map(|a| a.definition.points_award)
        .sum();

    AchievementBoard {
        summary: AchievementSummary {
            total: CATALOG.len(),
            unlocked: unlocked_count,
            locked: CATALOG.len() - unlocked_count,
            achievement_points,
        },
        achievements,
        by_tier,
    }
}
