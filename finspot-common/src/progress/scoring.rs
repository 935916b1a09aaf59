//! Point and XP pricing for a single sighting
//!
//! Two independent currencies are priced here:
//! - **Points** feed `total_points`, leaderboards and points achievements.
//! - **XP** feeds rank classification only.
//!
//! The two tables use different constants per rarity and different defaults
//! for an unrecognized rarity. Keep them separate.

use super::types::{PhotoQuality, Rarity};
use serde::Serialize;

/// Minimum photo-verification confidence that counts as verified
pub const VERIFICATION_THRESHOLD: f32 = 0.65;

/// Base points by rarity (before verification multiplier and photo bonus)
pub fn base_points(rarity: Rarity) -> u32 {
    match rarity {
        Rarity::Epic => 100,
        Rarity::Rare => 50,
        Rarity::Uncommon => 25,
        // Unrecognized rarity is priced as common
        Rarity::Common | Rarity::Unknown => 10,
    }
}

/// Flat bonus for the attached photo
pub fn photo_bonus(photo_quality: Option<PhotoQuality>) -> u32 {
    match photo_quality {
        Some(PhotoQuality::High) => 20,
        Some(PhotoQuality::Medium) => 10,
        Some(PhotoQuality::Low) => 5,
        None => 0,
    }
}

/// Points awarded for one sighting
///
/// Order: base → ×1.5 (floored) when verified → + photo bonus.
///
/// ```
/// use finspot_common::progress::{compute_points, PhotoQuality, Rarity};
///
/// assert_eq!(compute_points(Rarity::Epic, true, Some(PhotoQuality::High)), 170);
/// assert_eq!(compute_points(Rarity::Common, false, None), 10);
/// ```
pub fn compute_points(rarity: Rarity, verified: bool, photo_quality: Option<PhotoQuality>) -> u32 {
    let mut points = base_points(rarity);
    if verified {
        // Integer form of floor(points * 1.5)
        points = points * 3 / 2;
    }
    points + photo_bonus(photo_quality)
}

/// XP awarded for one sighting
pub fn xp_for_rarity(rarity: Rarity) -> u32 {
    match rarity {
        Rarity::Epic => 75,
        Rarity::Rare => 25,
        Rarity::Uncommon => 15,
        Rarity::Common => 5,
        Rarity::Unknown => 10,
    }
}

/// Whether a verification confidence clears the threshold
///
/// Confidence is clamped to `[0, 1]`; NaN never verifies.
pub fn is_verified_confidence(confidence: f32) -> bool {
    clamp_confidence(confidence) >= VERIFICATION_THRESHOLD
}

/// Clamp a confidence into `[0, 1]`, mapping NaN to 0
pub fn clamp_confidence(confidence: f32) -> f32 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

/// Display band for a verification confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    High,
    Moderate,
    Low,
}

impl ConfidenceBand {
    pub fn from_confidence(confidence: f32) -> Self {
        let c = clamp_confidence(confidence);
        if c >= 0.75 {
            ConfidenceBand::High
        } else if c >= 0.5 {
            ConfidenceBand::Moderate
        } else {
            ConfidenceBand::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_points_table() {
        assert_eq!(compute_points(Rarity::Epic, false, None), 100);
        assert_eq!(compute_points(Rarity::Rare, false, None), 50);
        assert_eq!(compute_points(Rarity::Uncommon, false, None), 25);
        assert_eq!(compute_points(Rarity::Common, false, None), 10);
        assert_eq!(compute_points(Rarity::Unknown, false, None), 10);
    }

    #[test]
    fn test_verified_multiplier_floors() {
        assert_eq!(compute_points(Rarity::Epic, true, None), 150);
        assert_eq!(compute_points(Rarity::Rare, true, None), 75);
        // 25 * 1.5 = 37.5
        assert_eq!(compute_points(Rarity::Uncommon, true, None), 37);
        assert_eq!(compute_points(Rarity::Common, true, None), 15);
    }

    #[test]
    fn test_photo_bonus_added_after_multiplier() {
        assert_eq!(compute_points(Rarity::Epic, true, Some(PhotoQuality::High)), 170);
        assert_eq!(compute_points(Rarity::Uncommon, true, Some(PhotoQuality::Low)), 42);
        assert_eq!(compute_points(Rarity::Common, false, Some(PhotoQuality::Medium)), 20);
    }

    #[test]
    fn test_verification_never_decreases_points() {
        let qualities = [
            None,
            Some(PhotoQuality::Low),
            Some(PhotoQuality::Medium),
            Some(PhotoQuality::High),
        ];
        for rarity in Rarity::all_variants() {
            for quality in qualities {
                assert!(
                    compute_points(*rarity, false, quality) <= compute_points(*rarity, true, quality),
                    "verification lowered points for {:?}/{:?}",
                    rarity,
                    quality
                );
            }
        }
    }

    #[test]
    fn test_xp_table_is_distinct_from_points() {
        assert_eq!(xp_for_rarity(Rarity::Epic), 75);
        assert_eq!(xp_for_rarity(Rarity::Rare), 25);
        assert_eq!(xp_for_rarity(Rarity::Uncommon), 15);
        assert_eq!(xp_for_rarity(Rarity::Common), 5);
        // Unknown rarity: XP default differs from the common entry
        assert_eq!(xp_for_rarity(Rarity::Unknown), 10);
        assert_ne!(xp_for_rarity(Rarity::Unknown), xp_for_rarity(Rarity::Common));
    }

    #[test]
    fn test_verification_threshold() {
        assert!(is_verified_confidence(0.65));
        assert!(is_verified_confidence(0.98));
        assert!(!is_verified_confidence(0.64));
        assert!(!is_verified_confidence(f32::NAN));
        assert!(is_verified_confidence(7.0));
        assert!(!is_verified_confidence(-1.0));
    }

    #[test]
    fn test_confidence_band() {
        assert_eq!(ConfidenceBand::from_confidence(0.9), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::from_confidence(0.75), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::from_confidence(0.6), ConfidenceBand::Moderate);
        assert_eq!(ConfidenceBand::from_confidence(0.2), ConfidenceBand::Low);
    }
}
