//! MindBridge Match - therapist matching service for the MindBridge platform
//!
//! Scores how well each therapist fits a client's stated preferences,
//! persists one score per (client, therapist) pair and returns ranked
//! recommendations with human-readable reasons.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use self::core::{MatchResult, Matcher};
pub use models::{
    ClientPreferences, MatchMode, MatchWeights, MatchingScore, RankedMatches, ScoreBreakdown,
    TherapistMatch, TherapistProfile, UrgencyLevel, UrgencyMultipliers,
};
pub use services::{InMemoryRepository, MatchRepository, MatchingEngine, PostgresRepository, RepositoryError};
