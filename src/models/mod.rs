// Model exports
pub mod catalog;
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    ClientPreferences, CompatibilityScore, MatchMode, MatchWeights, MatchingScore, ParseUrgencyError,
    RankedMatches, ScoreBreakdown, TagSet, TherapistAvailability, TherapistMatch, TherapistProfile,
    UrgencyLevel, UrgencyMultipliers, NEUTRAL_SCORE,
};
pub use requests::{FindMatchesRequest, SavePreferencesRequest};
pub use responses::{
    CatalogEntry, CatalogResponse, ErrorResponse, FindMatchesResponse, HealthResponse,
    SavePreferencesResponse, TherapistDetailResponse,
};
