//! Rank classification from cumulative XP

use serde::{Deserialize, Serialize};

const INTERMEDIATE_XP: u32 = 100;
const EXPERT_XP: u32 = 500;
const MASTER_XP: u32 = 2000;

/// Coarse skill tier derived solely from XP
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Rank {
    #[default]
    Beginner,
    Intermediate,
    Expert,
    Master,
}

impl Rank {
    /// Parse a stored rank label; unknown labels fall back to `Beginner`
    pub fn from_str_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "intermediate" => Rank::Intermediate,
            "expert" => Rank::Expert,
            "master" => Rank::Master,
            _ => Rank::Beginner,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Beginner => "Beginner",
            Rank::Intermediate => "Intermediate",
            Rank::Expert => "Expert",
            Rank::Master => "Master",
        }
    }

    /// Lowest XP that classifies as this rank
    pub fn min_xp(&self) -> u32 {
        match self {
            Rank::Beginner => 0,
            Rank::Intermediate => INTERMEDIATE_XP,
            Rank::Expert => EXPERT_XP,
            Rank::Master => MASTER_XP,
        }
    }

    pub fn next(&self) -> Option<Rank> {
        match self {
            Rank::Beginner => Some(Rank::Intermediate),
            Rank::Intermediate => Some(Rank::Expert),
            Rank::Expert => Some(Rank::Master),
            Rank::Master => None,
        }
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map cumulative XP to a rank
pub fn classify_rank(xp: u32) -> Rank {
    if xp >= MASTER_XP {
        Rank::Master
    } else if xp >= EXPERT_XP {
        Rank::Expert
    } else if xp >= INTERMEDIATE_XP {
        Rank::Intermediate
    } else {
        Rank::Beginner
    }
}
