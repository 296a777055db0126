use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::core::is_eligible;
use crate::models::{ClientPreferences, CompatibilityScore, MatchingScore, TherapistProfile};
use crate::services::repository::{MatchRepository, RepositoryError};

/// Process-local repository
///
/// Therapists are enumerated in insertion order. Used by tests, benchmarks
/// and the `memory` storage backend.
#[derive(Default)]
pub struct InMemoryRepository {
    preferences: RwLock<HashMap<String, ClientPreferences>>,
    therapists: RwLock<Vec<TherapistProfile>>,
    scores: RwLock<HashMap<(String, String), MatchingScore>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a therapist, replacing any existing profile with the same id in place
    pub async fn insert_therapist(&self, profile: TherapistProfile) {
        let mut therapists = self.therapists.write().await;
        match therapists.iter_mut().find(|t| t.therapist_id == profile.therapist_id) {
            Some(existing) => *existing = profile,
            None => therapists.push(profile),
        }
    }

    pub async fn score_count(&self) -> usize {
        self.scores.read().await.len()
    }

    /// All stored scores for a client, sorted by therapist id
    pub async fn scores_for_client(&self, client_id: &str) -> Vec<MatchingScore> {
        let scores = self.scores.read().await;
        let mut found: Vec<MatchingScore> = scores
            .values()
            .filter(|s| s.client_id == client_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.therapist_id.cmp(&b.therapist_id));
        found
    }
}

#[async_trait]
impl MatchRepository for InMemoryRepository {
    async fn get_preferences(&self, client_id: &str) -> Result<Option<ClientPreferences>, RepositoryError> {
        Ok(self.preferences.read().await.get(client_id).cloned())
    }

    async fn list_eligible_therapists(&self) -> Result<Vec<TherapistProfile>, RepositoryError> {
        let therapists = self.therapists.read().await;
        Ok(therapists.iter().filter(|t| is_eligible(t)).cloned().collect())
    }

    async fn upsert_score(
        &self,
        client_id: &str,
        therapist_id: &str,
        score: &CompatibilityScore,
    ) -> Result<MatchingScore, RepositoryError> {
        let mut scores = self.scores.write().await;
        let key = (client_id.to_string(), therapist_id.to_string());

        let record = scores
            .entry(key)
            .and_modify(|existing| existing.apply(score))
            .or_insert_with(|| MatchingScore::new(client_id, therapist_id, score));

        Ok(record.clone())
    }

    async fn save_preferences(&self, preferences: &ClientPreferences) -> Result<ClientPreferences, RepositoryError> {
        let mut stored = self.preferences.write().await;
        let now = Utc::now();

        let mut record = preferences.clone().normalized();
        record.created_at = stored
            .get(&preferences.client_id)
            .and_then(|existing| existing.created_at)
            .or(Some(now));
        record.updated_at = Some(now);

        stored.insert(record.client_id.clone(), record.clone());
        Ok(record)
    }

    async fn get_therapist(&self, therapist_id: &str) -> Result<Option<TherapistProfile>, RepositoryError> {
        let therapists = self.therapists.read().await;
        Ok(therapists.iter().find(|t| t.therapist_id == therapist_id).cloned())
    }

    async fn get_score(&self, client_id: &str, therapist_id: &str) -> Result<Option<MatchingScore>, RepositoryError> {
        let scores = self.scores.read().await;
        Ok(scores
            .get(&(client_id.to_string(), therapist_id.to_string()))
            .cloned())
    }

    async fn health_check(&self) -> Result<bool, RepositoryError> {
        Ok(true)
    }
}
