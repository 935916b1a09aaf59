//! Leaderboard ranking
//!
//! Two projections:
//! - all-time, straight from each user's cumulative stats
//! - filtered, re-summed from raw sightings inside a time window and/or region
//!
//! Ordering is by points descending. Ties keep input order (stable sort), so
//! callers that want a deterministic tie-break must feed users in that order.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::rank::Rank;
use super::scoring::compute_points;
use super::types::{CumulativeStats, SightingEvent};

/// Entries returned when the caller does not ask for a limit
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 100;

/// Time window of a leaderboard query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LeaderboardPeriod {
    #[default]
    AllTime,
    Weekly,
    Monthly,
}

impl LeaderboardPeriod {
    /// Parse `all-time | weekly | monthly`; anything else is all-time
    pub fn from_str_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "weekly" => LeaderboardPeriod::Weekly,
            "monthly" => LeaderboardPeriod::Monthly,
            _ => LeaderboardPeriod::AllTime,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LeaderboardPeriod::AllTime => "all-time",
            LeaderboardPeriod::Weekly => "weekly",
            LeaderboardPeriod::Monthly => "monthly",
        }
    }

    /// Start of the window ending at `now`, or `None` for all-time
    pub fn since(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            LeaderboardPeriod::AllTime => None,
            LeaderboardPeriod::Weekly => Some(now - Duration::days(7)),
            LeaderboardPeriod::Monthly => Some(now - Duration::days(30)),
        }
    }
}

/// Which sightings a filtered leaderboard counts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaderboardFilter {
    /// Inclusive lower bound on `occurred_at`
    pub since: Option<DateTime<Utc>>,
    /// Exact region match
    pub region: Option<String>,
}

impl LeaderboardFilter {
    pub fn new(period: LeaderboardPeriod, region: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            since: period.since(now),
            region: region.filter(|r| !r.trim().is_empty()),
        }
    }

    /// True when no window or region applies (use the all-time projection)
    pub fn is_unfiltered(&self) -> bool {
        self.since.is_none() && self.region.is_none()
    }

    pub fn matches(&self, event: &SightingEvent) -> bool {
        if let Some(since) = self.since {
            if event.occurred_at < since {
                return false;
            }
        }
        match &self.region {
            Some(region) => event.region.as_deref() == Some(region.as_str()),
            None => true,
        }
    }
}

/// A user competing on the all-time board
#[derive(Debug, Clone)]
pub struct Contender {
    pub user_id: String,
    pub display_name: String,
    pub stats: CumulativeStats,
}

/// A sighting attributed to a user, input to the filtered board
#[derive(Debug, Clone)]
pub struct AttributedSighting {
    pub user_id: String,
    pub display_name: String,
    pub event: SightingEvent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    /// 1-based
    pub position: u32,
    pub user_id: String,
    pub display_name: String,
    pub total_points: u32,
    pub total_sightings: u32,
    pub unique_species_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xp: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<Rank>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rare_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epic_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_count: Option<u32>,
}

/// Rank users by all-time `total_points`
pub fn build_leaderboard(contenders: &[Contender], limit: usize) -> Vec<LeaderboardEntry> {
    let mut ordered: Vec<&Contender> = contenders.iter().collect();
    // Vec::sort_by is stable: equal scores keep input order
    ordered.sort_by(|a, b| b.stats.total_points.cmp(&a.stats.total_points));

    ordered
        .into_iter()
        .take(limit)
        .zip(1u32..)
        .map(|(c, position)| LeaderboardEntry {
            position,
            user_id: c.user_id.clone(),
            display_name: c.display_name.clone(),
            total_points: c.stats.total_points,
            total_sightings: c.stats.total_sightings,
            unique_species_count: c.stats.unique_species_count,
            xp: Some(c.stats.xp),
            rank: Some(c.stats.rank),
            rare_count: Some(c.stats.rare_count),
            epic_count: Some(c.stats.epic_count),
            verified_count: Some(c.stats.verified_count),
        })
        .collect()
}

struct WindowTotals<'a> {
    user_id: &'a str,
    display_name: &'a str,
    points: u32,
    sightings: u32,
    species: HashSet<&'a str>,
}

/// Rank users by points earned from sightings matching `filter`
///
/// Users appear in order of their first matching sighting before sorting,
/// which is what ties fall back to. Users with no matching sightings are
/// left out.
pub fn build_filtered_leaderboard(
    sightings: &[AttributedSighting],
    filter: &LeaderboardFilter,
    limit: usize,
) -> Vec<LeaderboardEntry> {
    let mut totals: Vec<WindowTotals<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for s in sightings.iter().filter(|s| filter.matches(&s.event)) {
        let slot = *index.entry(s.user_id.as_str()).or_insert_with(|| {
            totals.push(WindowTotals {
                user_id: &s.user_id,
                display_name: &s.display_name,
                points: 0,
                sightings: 0,
                species: HashSet::new(),
            });
            totals.len() - 1
        });
        let t = &mut totals[slot];
        t.points = t.points.saturating_add(compute_points(
            s.event.rarity,
            s.event.verified,
            s.event.photo_quality,
        ));
        t.sightings += 1;
        t.species.insert(&s.event.subject_id);
    }

    totals.sort_by(|a, b| b.points.cmp(&a.points));

    totals
        .into_iter()
        .take(limit)
        .zip(1u32..)
        .map(|(t, position)| LeaderboardEntry {
            position,
            user_id: t.user_id.to_string(),
            display_name: t.display_name.to_string(),
            total_points: t.points,
            total_sightings: t.sightings,
            unique_species_count: t.species.len() as u32,
            xp: None,
            rank: None,
            rare_count: None,
            epic_count: None,
            verified_count: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::types::{PhotoQuality, Rarity};

    fn contender(id: &str, points: u32) -> Contender {
        Contender {
            user_id: id.to_string(),
            display_name: format!("Diver {}", id),
            stats: CumulativeStats {
                total_points: points,
                ..Default::default()
            },
        }
    }

    fn sighting(user: &str, subject: &str, rarity: Rarity, days_ago: i64, region: Option<&str>) -> AttributedSighting {
        AttributedSighting {
            user_id: user.to_string(),
            display_name: user.to_uppercase(),
            event: SightingEvent {
                subject_id: subject.to_string(),
                rarity,
                verified: false,
                verification_confidence: 0.0,
                photo_quality: None,
                occurred_at: Utc::now() - Duration::days(days_ago),
                region: region.map(str::to_string),
            },
        }
    }

    #[test]
    fn test_top_two_of_three() {
        let board = build_leaderboard(
            &[contender("a", 300), contender("b", 150), contender("c", 450)],
            2,
        );
        assert_eq!(board.len(), 2);
        assert_eq!((board[0].user_id.as_str(), board[0].total_points, board[0].position), ("c", 450, 1));
        assert_eq!((board[1].user_id.as_str(), board[1].total_points, board[1].position), ("a", 300, 2));
    }

    #[test]
    fn test_ties_keep_input_order() {
        let board = build_leaderboard(
            &[contender("first", 100), contender("second", 200), contender("third", 100)],
            DEFAULT_LEADERBOARD_LIMIT,
        );
        let order: Vec<_> = board.iter().map(|e| e.user_id.as_str()).collect();
        assert_eq!(order, vec!["second", "first", "third"]);
        assert_eq!(board[2].position, 3);
    }

    #[test]
    fn test_empty_and_zero_limit() {
        assert!(build_leaderboard(&[], 10).is_empty());
        assert!(build_leaderboard(&[contender("a", 1)], 0).is_empty());
    }

    #[test]
    fn test_all_time_entries_carry_full_stats() {
        let board = build_leaderboard(&[contender("a", 10)], 5);
        assert_eq!(board[0].xp, Some(0));
        assert_eq!(board[0].rank, Some(Rank::Beginner));
        assert_eq!(board[0].display_name, "Diver a");
    }

    #[test]
    fn test_filtered_by_window() {
        let sightings = vec![
            sighting("a", "tuna", Rarity::Epic, 20, None),
            sighting("a", "cod", Rarity::Common, 1, None),
            sighting("b", "ray", Rarity::Rare, 2, None),
            sighting("b", "ray", Rarity::Rare, 3, None),
            sighting("c", "eel", Rarity::Uncommon, 10, None),
        ];
        let filter = LeaderboardFilter::new(LeaderboardPeriod::Weekly, None, Utc::now());
        let board = build_filtered_leaderboard(&sightings, &filter, DEFAULT_LEADERBOARD_LIMIT);

        assert_eq!(board.len(), 2);
        assert_eq!(board[0].user_id, "b");
        assert_eq!(board[0].total_points, 100);
        assert_eq!(board[0].total_sightings, 2);
        assert_eq!(board[0].unique_species_count, 1);
        assert_eq!(board[1].user_id, "a");
        assert_eq!(board[1].total_points, 10);
        assert_eq!(board[1].xp, None);
    }

    #[test]
    fn test_filtered_by_region_and_scoring() {
        let mut verified = sighting("a", "shark", Rarity::Epic, 400, Some("Pacific"));
        verified.event.verified = true;
        verified.event.photo_quality = Some(PhotoQuality::High);
        let sightings = vec![
            verified,
            sighting("b", "shark", Rarity::Epic, 1, Some("North Atlantic")),
            sighting("b", "cod", Rarity::Common, 1, Some("Pacific")),
        ];
        let filter = LeaderboardFilter::new(LeaderboardPeriod::AllTime, Some("Pacific".to_string()), Utc::now());
        assert!(!filter.is_unfiltered());

        let board = build_filtered_leaderboard(&sightings, &filter, 10);
        assert_eq!(board.len(), 2);
        assert_eq!((board[0].user_id.as_str(), board[0].total_points), ("a", 170));
        assert_eq!((board[1].user_id.as_str(), board[1].total_points), ("b", 10));
    }

    #[test]
    fn test_filter_blank_region_is_unfiltered() {
        let filter = LeaderboardFilter::new(LeaderboardPeriod::AllTime, Some("  ".to_string()), Utc::now());
        assert!(filter.is_unfiltered());
    }

    #[test]
    fn test_period_parsing_and_window() {
        let now = Utc::now();
        assert_eq!(LeaderboardPeriod::from_str_lenient("Weekly"), LeaderboardPeriod::Weekly);
        assert_eq!(LeaderboardPeriod::from_str_lenient("monthly"), LeaderboardPeriod::Monthly);
        assert_eq!(LeaderboardPeriod::from_str_lenient("yearly"), LeaderboardPeriod::AllTime);
        assert_eq!(LeaderboardPeriod::Weekly.since(now), Some(now - Duration::days(7)));
        assert_eq!(LeaderboardPeriod::Monthly.since(now), Some(now - Duration::days(30)));
        assert_eq!(LeaderboardPeriod::AllTime.since(now), None);
    }
}
