//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::progress::{PhotoQuality, Rarity, SightingEvent};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A row of `user_sightings`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SightingRecord {
    pub id: String,
    pub user_id: String,
    pub fish_id: String,
    pub fish_name: String,
    pub rarity: Rarity,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_url: Option<String>,
    pub verified: bool,
    pub verification_confidence: f32,
    pub photo_quality: Option<PhotoQuality>,
    /// Points awarded when the sighting was recorded
    pub points: u32,
    pub region: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl SightingRecord {
    /// The engine's view of this sighting
    pub fn to_event(&self) -> SightingEvent {
        SightingEvent {
            subject_id: self.fish_id.clone(),
            rarity: self.rarity,
            verified: self.verified,
            verification_confidence: self.verification_confidence,
            photo_quality: self.photo_quality,
            occurred_at: self.occurred_at,
            region: self.region.clone(),
        }
    }
}

/// A row of `user_achievements`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockedAchievement {
    pub user_id: String,
    pub achievement_id: String,
    pub unlocked_at: DateTime<Utc>,
}
