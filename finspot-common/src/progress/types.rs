//! Value types consumed and produced by the progress engine
//!
//! Everything here is plain data: the engine never touches storage, and the
//! service layer converts database rows into these types before calling it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::rank::Rank;

/// Encounter frequency of a species
///
/// Drives both scoring tables (points and XP). Values that do not match a
/// known rarity are kept as `Unknown` rather than rejected, because the two
/// tables default an unrecognized rarity differently (see
/// [`crate::progress::scoring`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    #[serde(other)]
    Unknown,
}

impl Rarity {
    /// Parse rarity from user input or a database column (case-insensitive)
    ///
    /// Never fails: anything unrecognized becomes [`Rarity::Unknown`].
    pub fn from_str_lenient(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "COMMON" => Rarity::Common,
            "UNCOMMON" => Rarity::Uncommon,
            "RARE" => Rarity::Rare,
            "EPIC" => Rarity::Epic,
            _ => Rarity::Unknown,
        }
    }

    /// Canonical database representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Rarity::Common => "COMMON",
            Rarity::Uncommon => "UNCOMMON",
            Rarity::Rare => "RARE",
            Rarity::Epic => "EPIC",
            Rarity::Unknown => "UNKNOWN",
        }
    }

    pub fn all_variants() -> &'static [Rarity] {
        &[
            Rarity::Common,
            Rarity::Uncommon,
            Rarity::Rare,
            Rarity::Epic,
            Rarity::Unknown,
        ]
    }
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

/// Quality grade of the photo attached to a sighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PhotoQuality {
    Low,
    Medium,
    High,
}

impl PhotoQuality {
    /// Parse photo quality (case-insensitive); unrecognized input yields `None`
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "LOW" => Some(PhotoQuality::Low),
            "MEDIUM" => Some(PhotoQuality::Medium),
            "HIGH" => Some(PhotoQuality::High),
            _ => None,
        }
    }

    pub fn to_db_string(&self) -> &'static str {
        match self {
            PhotoQuality::Low => "LOW",
            PhotoQuality::Medium => "MEDIUM",
            PhotoQuality::High => "HIGH",
        }
    }
}

/// A single recorded sighting, immutable once created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SightingEvent {
    /// Fish / species identifier
    pub subject_id: String,
    pub rarity: Rarity,
    pub verified: bool,
    /// Photo verification confidence in `[0, 1]`
    pub verification_confidence: f32,
    pub photo_quality: Option<PhotoQuality>,
    pub occurred_at: DateTime<Utc>,
    pub region: Option<String>,
}

/// Per-user running totals
///
/// `rank` is always derived from `xp`; the accumulator is the only writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CumulativeStats {
    pub xp: u32,
    pub rank: Rank,
    pub total_points: u32,
    pub total_sightings: u32,
    pub unique_species_count: u32,
    pub rare_count: u32,
    pub epic_count: u32,
    pub verified_count: u32,
    pub updated_at: DateTime<Utc>,
}

impl CumulativeStats {
    /// Fresh stats for a user with no sightings
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            updated_at: now,
            ..Self::default()
        }
    }

    /// Compare every counter, ignoring `updated_at`
    pub fn same_counters(&self, other: &Self) -> bool {
        self.xp == other.xp
            && self.rank == other.rank
            && self.total_points == other.total_points
            && self.total_sightings == other.total_sightings
            && self.unique_species_count == other.unique_species_count
            && self.rare_count == other.rare_count
            && self.epic_count == other.epic_count
            && self.verified_count == other.verified_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rarity_parse_case_insensitive() {
        assert_eq!(Rarity::from_str_lenient("epic"), Rarity::Epic);
        assert_eq!(Rarity::from_str_lenient("Rare"), Rarity::Rare);
        assert_eq!(Rarity::from_str_lenient(" UNCOMMON "), Rarity::Uncommon);
        assert_eq!(Rarity::from_str_lenient("common"), Rarity::Common);
    }

    #[test]
    fn test_rarity_parse_unknown() {
        assert_eq!(Rarity::from_str_lenient("legendary"), Rarity::Unknown);
        assert_eq!(Rarity::from_str_lenient(""), Rarity::Unknown);
    }

    #[test]
    fn test_rarity_db_string_roundtrips() {
        for rarity in Rarity::all_variants() {
            assert_eq!(Rarity::from_str_lenient(rarity.to_db_string()), *rarity);
        }
    }

    #[test]
    fn test_rarity_serde_unknown_variant() {
        let parsed: Rarity = serde_json::from_str("\"MYTHIC\"").unwrap();
        assert_eq!(parsed, Rarity::Unknown);
        let parsed: Rarity = serde_json::from_str("\"EPIC\"").unwrap();
        assert_eq!(parsed, Rarity::Epic);
    }

    #[test]
    fn test_photo_quality_parse() {
        assert_eq!(PhotoQuality::from_str("high"), Some(PhotoQuality::High));
        assert_eq!(PhotoQuality::from_str("Medium"), Some(PhotoQuality::Medium));
        assert_eq!(PhotoQuality::from_str("LOW"), Some(PhotoQuality::Low));
        assert_eq!(PhotoQuality::from_str("blurry"), None);
    }

    #[test]
    fn test_empty_stats_are_zero() {
        let now = Utc::now();
        let stats = CumulativeStats::empty(now);
        assert_eq!(stats.xp, 0);
        assert_eq!(stats.rank, Rank::Beginner);
        assert_eq!(stats.total_sightings, 0);
        assert_eq!(stats.updated_at, now);
    }
}
