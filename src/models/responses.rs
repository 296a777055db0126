use serde::{Deserialize, Serialize};

use crate::models::domain::{MatchMode, MatchingScore, TherapistMatch, TherapistProfile};

/// Response for find matches endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindMatchesResponse {
    #[serde(rename = "clientId")]
    pub client_id: String,
    pub mode: MatchMode,
    pub matches: Vec<TherapistMatch>,
    #[serde(rename = "totalResults")]
    pub total_results: usize,
}

/// Therapist profile together with the caller's stored score, if any
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TherapistDetailResponse {
    pub therapist: TherapistProfile,
    #[serde(rename = "matchingScore")]
    pub matching_score: Option<MatchingScore>,
}

/// Code/label pair for catalog listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub code: String,
    pub label: String,
}

/// Choices offered on the preferences form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub specializations: Vec<CatalogEntry>,
    #[serde(rename = "therapyApproaches")]
    pub therapy_approaches: Vec<CatalogEntry>,
    #[serde(rename = "urgencyLevels")]
    pub urgency_levels: Vec<CatalogEntry>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

/// Save preferences response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavePreferencesResponse {
    pub success: bool,
    #[serde(rename = "clientId")]
    pub client_id: String,
}
