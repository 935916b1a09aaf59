//! # finspot Common Library
//!
//! Shared code for the finspot sighting tracker:
//! - Progress engine (scoring, rank, accumulation, achievements, leaderboards)
//! - Database schema, migrations and row models
//! - Configuration loading
//! - Error types and small utilities

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod progress;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
pub use progress::{CumulativeStats, Rank, Rarity, SightingEvent};
