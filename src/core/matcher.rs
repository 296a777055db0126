use std::cmp::Ordering;

use crate::core::{
    filters::eligible_candidates,
    reasons::{basic_match_reasons, generate_match_reasons},
    scoring::{calculate_compatibility, rating_score, round3},
};
use crate::models::{
    ClientPreferences, CompatibilityScore, MatchWeights, ScoreBreakdown, TherapistMatch,
    TherapistProfile, UrgencyMultipliers, NEUTRAL_SCORE,
};

/// Rating breakdown used in basic mode for therapists with no reviews yet
const UNRATED_BASIC_SCORE: f64 = 0.5;

/// Result of the matching process
#[derive(Debug)]
pub struct MatchResult {
    pub matches: Vec<TherapistMatch>,
    pub total_candidates: usize,
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Eligibility filter (accepting clients, active account)
/// 2. Per-factor scoring and weighted aggregation
/// 3. Urgency adjustment
/// 4. Stable ranking and truncation
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: MatchWeights,
    urgency: UrgencyMultipliers,
}

impl Matcher {
    pub fn new(weights: MatchWeights, urgency: UrgencyMultipliers) -> Self {
        Self { weights, urgency }
    }

    pub fn with_default_weights() -> Self {
        Self::new(MatchWeights::default(), UrgencyMultipliers::default())
    }

    pub fn weights(&self) -> &MatchWeights {
        &self.weights
    }

    pub fn urgency(&self) -> &UrgencyMultipliers {
        &self.urgency
    }

    /// Score a single client/therapist pair
    pub fn score(&self, preferences: &ClientPreferences, profile: &TherapistProfile) -> CompatibilityScore {
        calculate_compatibility(preferences, profile, &self.weights, &self.urgency)
    }

    /// Score every eligible candidate, keeping enumeration order
    pub fn score_candidates(
        &self,
        preferences: &ClientPreferences,
        candidates: Vec<TherapistProfile>,
    ) -> Vec<TherapistMatch> {
        eligible_candidates(candidates)
            .into_iter()
            .map(|profile| {
                let score = self.score(preferences, &profile);
                let match_reasons = generate_match_reasons(preferences, &profile);

                TherapistMatch {
                    therapist: profile,
                    score: score.overall,
                    breakdown: score.breakdown,
                    match_reasons,
                }
            })
            .collect()
    }

    /// Find the best therapists for a client with stored preferences
    ///
    /// # Arguments
    /// * `preferences` - The client's matching preferences
    /// * `candidates` - Therapist profiles in storage enumeration order
    /// * `limit` - Maximum number of matches to return (0 is treated as 1)
    pub fn find_matches(
        &self,
        preferences: &ClientPreferences,
        candidates: Vec<TherapistProfile>,
        limit: usize,
    ) -> MatchResult {
        let total_candidates = candidates.len();
        let scored = self.score_candidates(preferences, candidates);

        MatchResult {
            matches: rank_matches(scored, limit),
            total_candidates,
        }
    }

    /// Fallback ranking for clients without a preference record
    ///
    /// Highest rated first, then most experienced; every factor gets the
    /// neutral score and reasons only mention experience and rating.
    pub fn basic_matches(&self, candidates: Vec<TherapistProfile>, limit: usize) -> MatchResult {
        let total_candidates = candidates.len();
        let mut eligible = eligible_candidates(candidates);

        eligible.sort_by(|a, b| {
            b.rating
                .partial_cmp(&a.rating)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.years_of_experience.cmp(&a.years_of_experience))
        });
        eligible.truncate(limit.max(1));

        let matches = eligible
            .into_iter()
            .map(|profile| {
                let rating = if profile.rating > 0.0 {
                    round3(rating_score(profile.rating))
                } else {
                    UNRATED_BASIC_SCORE
                };
                let match_reasons = basic_match_reasons(&profile);

                TherapistMatch {
                    therapist: profile,
                    score: NEUTRAL_SCORE,
                    breakdown: ScoreBreakdown::neutral(rating),
                    match_reasons,
                }
            })
            .collect();

        MatchResult {
            matches,
            total_candidates,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

/// Sort by overall score descending and keep the top `limit`
///
/// The sort is stable: equal scores keep their input order.
pub fn rank_matches(mut matches: Vec<TherapistMatch>, limit: usize) -> Vec<TherapistMatch> {
    matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    matches.truncate(limit.max(1));
    matches
}
