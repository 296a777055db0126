use std::sync::Arc;

use crate::core::{rank_matches, Matcher};
use crate::models::{CompatibilityScore, MatchMode, RankedMatches};
use crate::services::repository::{MatchRepository, RepositoryError};

/// Default number of matches returned when the caller does not choose
pub const DEFAULT_LIMIT: usize = 10;

/// Matching engine: repository reads, scoring, score persistence, ranking
///
/// Scoring itself is synchronous; the engine only awaits storage. Scores
/// are upserted one by one with no surrounding transaction, so concurrent
/// runs for the same client resolve as last-write-wins.
#[derive(Clone)]
pub struct MatchingEngine {
    repository: Arc<dyn MatchRepository>,
    matcher: Matcher,
}

impl MatchingEngine {
    pub fn new(repository: Arc<dyn MatchRepository>, matcher: Matcher) -> Self {
        Self { repository, matcher }
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn repository(&self) -> &Arc<dyn MatchRepository> {
        &self.repository
    }

    /// Rank therapists for a client
    ///
    /// Falls back to basic mode when the client has no preference record.
    /// In full mode every scored pair is persisted before truncation, so
    /// stored scores cover all eligible therapists, not just the top `limit`.
    pub async fn find_matches(&self, client_id: &str, limit: usize) -> Result<RankedMatches, RepositoryError> {
        let limit = limit.max(1);

        let preferences = self.repository.get_preferences(client_id).await?;
        let candidates = self.repository.list_eligible_therapists().await?;
        let total_candidates = candidates.len();

        let preferences = match preferences {
            Some(prefs) => prefs,
            None => {
                tracing::info!(
                    "No preferences stored for client {}, using basic matching over {} therapists",
                    client_id,
                    total_candidates
                );
                let result = self.matcher.basic_matches(candidates, limit);
                return Ok(RankedMatches {
                    mode: MatchMode::Basic,
                    matches: result.matches,
                    total_candidates,
                });
            }
        };

        let scored = self.matcher.score_candidates(&preferences, candidates);

        for m in &scored {
            let score = CompatibilityScore {
                overall: m.score,
                breakdown: m.breakdown,
            };
            self.repository
                .upsert_score(client_id, &m.therapist.therapist_id, &score)
                .await?;
        }

        tracing::debug!("Persisted {} scores for client {}", scored.len(), client_id);

        let matches = rank_matches(scored, limit);

        tracing::info!(
            "Ranked {} matches for client {} (urgency: {}, from {} candidates)",
            matches.len(),
            client_id,
            preferences.urgency,
            total_candidates
        );

        Ok(RankedMatches {
            mode: MatchMode::Full,
            matches,
            total_candidates,
        })
    }
}
