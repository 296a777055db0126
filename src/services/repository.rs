use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ClientPreferences, CompatibilityScore, MatchingScore, TherapistProfile};

/// Errors that can occur when reading or writing match data
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("SQLx error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid stored value: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Storage seam for the matching engine
///
/// The engine only ever needs the first three methods; the rest back the
/// preference form and therapist detail endpoints.
#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Stored preferences for a client, if they ever filled in the form
    async fn get_preferences(&self, client_id: &str) -> Result<Option<ClientPreferences>, RepositoryError>;

    /// Therapists accepting new clients with an active account, in a stable order
    async fn list_eligible_therapists(&self) -> Result<Vec<TherapistProfile>, RepositoryError>;

    /// Insert or overwrite the score for a (client, therapist) pair
    async fn upsert_score(
        &self,
        client_id: &str,
        therapist_id: &str,
        score: &CompatibilityScore,
    ) -> Result<MatchingScore, RepositoryError>;

    /// Create or replace a client's preference record
    async fn save_preferences(&self, preferences: &ClientPreferences) -> Result<ClientPreferences, RepositoryError>;

    async fn get_therapist(&self, therapist_id: &str) -> Result<Option<TherapistProfile>, RepositoryError>;

    async fn get_score(&self, client_id: &str, therapist_id: &str) -> Result<Option<MatchingScore>, RepositoryError>;

    async fn health_check(&self) -> Result<bool, RepositoryError>;
}
