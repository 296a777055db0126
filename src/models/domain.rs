use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Set of normalized string tags (specialization codes, languages, time slots...)
pub type TagSet = BTreeSet<String>;

/// How soon a client needs to start therapy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    Low,
    #[default]
    Medium,
    High,
    Crisis,
}

impl UrgencyLevel {
    pub const ALL: [UrgencyLevel; 4] = [
        UrgencyLevel::Low,
        UrgencyLevel::Medium,
        UrgencyLevel::High,
        UrgencyLevel::Crisis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyLevel::Low => "low",
            UrgencyLevel::Medium => "medium",
            UrgencyLevel::High => "high",
            UrgencyLevel::Crisis => "crisis",
        }
    }

    /// Human readable description shown on the preferences form
    pub fn description(&self) -> &'static str {
        match self {
            UrgencyLevel::Low => "Not urgent, flexible timing",
            UrgencyLevel::Medium => "Would like to start within 2 weeks",
            UrgencyLevel::High => "Need to start within a few days",
            UrgencyLevel::Crisis => "Need immediate support",
        }
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown urgency level: {0}")]
pub struct ParseUrgencyError(pub String);

impl FromStr for UrgencyLevel {
    type Err = ParseUrgencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(UrgencyLevel::Low),
            "medium" => Ok(UrgencyLevel::Medium),
            "high" => Ok(UrgencyLevel::High),
            "crisis" => Ok(UrgencyLevel::Crisis),
            other => Err(ParseUrgencyError(other.to_string())),
        }
    }
}

/// A client's stated therapist preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientPreferences {
    #[serde(rename = "clientId")]
    pub client_id: String,
    #[serde(default)]
    pub concerns: TagSet,
    #[serde(rename = "preferredSpecializations", default)]
    pub preferred_specializations: TagSet,
    #[serde(rename = "preferredApproaches", default)]
    pub preferred_approaches: TagSet,
    #[serde(rename = "preferredTimes", default)]
    pub preferred_times: TagSet,
    #[serde(rename = "genderPreference", default)]
    pub gender_preference: Option<String>,
    #[serde(rename = "agePreference", default)]
    pub age_preference: Option<String>,
    #[serde(rename = "preferredLanguages", default)]
    pub preferred_languages: TagSet,
    #[serde(rename = "budgetMax", default)]
    pub budget_max: Option<f64>,
    #[serde(rename = "insuranceProvider", default)]
    pub insurance_provider: Option<String>,
    #[serde(rename = "sessionFrequency", default = "default_session_frequency")]
    pub session_frequency: String,
    #[serde(default)]
    pub urgency: UrgencyLevel,
    #[serde(rename = "previousTherapyExperience", default)]
    pub previous_therapy_experience: bool,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_session_frequency() -> String {
    "weekly".to_string()
}

impl ClientPreferences {
    /// Empty preference record with the same defaults the preferences form uses
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            concerns: TagSet::new(),
            preferred_specializations: TagSet::new(),
            preferred_approaches: TagSet::new(),
            preferred_times: TagSet::new(),
            gender_preference: None,
            age_preference: None,
            preferred_languages: TagSet::new(),
            budget_max: None,
            insurance_provider: None,
            session_frequency: default_session_frequency(),
            urgency: UrgencyLevel::default(),
            previous_therapy_experience: false,
            created_at: None,
            updated_at: None,
        }
    }

    /// Trim tags and text fields, dropping blanks
    ///
    /// Blank optional strings become `None` and a non-positive budget is
    /// treated as no budget at all.
    pub fn normalized(mut self) -> Self {
        self.concerns = normalize_tags(self.concerns);
        self.preferred_specializations = normalize_tags(self.preferred_specializations);
        self.preferred_approaches = normalize_tags(self.preferred_approaches);
        self.preferred_times = normalize_tags(self.preferred_times);
        self.preferred_languages = normalize_tags(self.preferred_languages);
        self.gender_preference = normalize_text(self.gender_preference);
        self.age_preference = normalize_text(self.age_preference);
        self.insurance_provider = normalize_text(self.insurance_provider);
        self.budget_max = self.budget_max.filter(|b| b.is_finite() && *b > 0.0);
        if self.session_frequency.trim().is_empty() {
            self.session_frequency = default_session_frequency();
        }
        self
    }

    pub fn gender_preference(&self) -> Option<&str> {
        non_blank(self.gender_preference.as_deref())
    }

    pub fn age_preference(&self) -> Option<&str> {
        non_blank(self.age_preference.as_deref())
    }

    pub fn insurance_provider(&self) -> Option<&str> {
        non_blank(self.insurance_provider.as_deref())
    }

    pub fn has_insurance(&self) -> bool {
        self.insurance_provider().is_some()
    }

    /// Maximum per-session budget, if a usable one was given
    pub fn budget(&self) -> Option<f64> {
        self.budget_max.filter(|b| b.is_finite() && *b > 0.0)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn normalize_text(value: Option<String>) -> Option<String> {
    non_blank(value.as_deref()).map(str::to_string)
}

fn normalize_tags(tags: TagSet) -> TagSet {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Weekly availability published by a therapist
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TherapistAvailability {
    #[serde(rename = "preferredTimes", default)]
    pub preferred_times: TagSet,
    /// Day name -> free-form slot labels
    #[serde(default)]
    pub weekly: BTreeMap<String, Vec<String>>,
}

impl TherapistAvailability {
    pub fn with_times<I, S>(times: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            preferred_times: times.into_iter().map(Into::into).collect(),
            weekly: BTreeMap::new(),
        }
    }

    /// True when the therapist has published nothing at all
    pub fn is_empty(&self) -> bool {
        self.preferred_times.is_empty() && self.weekly.is_empty()
    }
}

/// Therapist profile as seen by the matcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TherapistProfile {
    #[serde(rename = "therapistId")]
    pub therapist_id: String,
    pub name: String,
    #[serde(default)]
    pub specializations: TagSet,
    #[serde(rename = "therapyApproaches", default)]
    pub therapy_approaches: TagSet,
    #[serde(default)]
    pub availability: TherapistAvailability,
    #[serde(rename = "yearsOfExperience", default)]
    pub years_of_experience: u32,
    #[serde(default)]
    pub languages: TagSet,
    #[serde(rename = "ratePerSession")]
    pub rate_per_session: f64,
    #[serde(rename = "acceptsInsurance", default)]
    pub accepts_insurance: bool,
    #[serde(default)]
    pub rating: f64,
    #[serde(rename = "totalReviews", default)]
    pub total_reviews: u32,
    #[serde(rename = "isAcceptingClients", default = "default_true")]
    pub is_accepting_clients: bool,
    #[serde(rename = "isActive", default = "default_true")]
    pub is_active: bool,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool { true }

/// Per-factor compatibility, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub specialization: f64,
    pub approach: f64,
    pub availability: f64,
    #[serde(rename = "preferences")]
    pub preference: f64,
    pub budget: f64,
    pub rating: f64,
}

impl ScoreBreakdown {
    /// Neutral breakdown used when the client has no stored preferences
    pub fn neutral(rating: f64) -> Self {
        Self {
            specialization: NEUTRAL_SCORE,
            approach: NEUTRAL_SCORE,
            availability: NEUTRAL_SCORE,
            preference: NEUTRAL_SCORE,
            budget: NEUTRAL_SCORE,
            rating,
        }
    }
}

/// Score given to every factor in basic matching mode
pub const NEUTRAL_SCORE: f64 = 0.7;

/// Overall score plus its breakdown for one client/therapist pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityScore {
    pub overall: f64,
    pub breakdown: ScoreBreakdown,
}

/// Persisted score for a (client, therapist) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingScore {
    pub id: Uuid,
    #[serde(rename = "clientId")]
    pub client_id: String,
    #[serde(rename = "therapistId")]
    pub therapist_id: String,
    #[serde(rename = "overallScore")]
    pub overall_score: f64,
    #[serde(rename = "specializationScore")]
    pub specialization_score: f64,
    #[serde(rename = "approachScore")]
    pub approach_score: f64,
    #[serde(rename = "availabilityScore")]
    pub availability_score: f64,
    #[serde(rename = "preferenceScore")]
    pub preference_score: f64,
    #[serde(rename = "budgetScore")]
    pub budget_score: f64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl MatchingScore {
    /// Fresh record for a pair that has never been scored
    pub fn new(client_id: &str, therapist_id: &str, score: &CompatibilityScore) -> Self {
        let now = Utc::now();
        let mut record = Self {
            id: Uuid::new_v4(),
            client_id: client_id.to_string(),
            therapist_id: therapist_id.to_string(),
            overall_score: 0.0,
            specialization_score: 0.0,
            approach_score: 0.0,
            availability_score: 0.0,
            preference_score: 0.0,
            budget_score: 0.0,
            created_at: now,
            updated_at: now,
        };
        record.apply(score);
        record
    }

    /// Overwrite the score columns, keeping id and creation time
    pub fn apply(&mut self, score: &CompatibilityScore) {
        self.overall_score = score.overall;
        self.specialization_score = score.breakdown.specialization;
        self.approach_score = score.breakdown.approach;
        self.availability_score = score.breakdown.availability;
        self.preference_score = score.breakdown.preference;
        self.budget_score = score.breakdown.budget;
        self.updated_at = Utc::now();
    }
}

/// Whether a ranking was driven by stored preferences or the neutral fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    Full,
    Basic,
}

/// One ranked recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TherapistMatch {
    pub therapist: TherapistProfile,
    pub score: f64,
    #[serde(rename = "scoreBreakdown")]
    pub breakdown: ScoreBreakdown,
    #[serde(rename = "matchReasons")]
    pub match_reasons: Vec<String>,
}

/// Output of a find-matches call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedMatches {
    pub mode: MatchMode,
    pub matches: Vec<TherapistMatch>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
}

/// Scoring weights
///
/// The defaults sum to 0.95, not 1.0. That is the production table and it is
/// kept as-is; do not renormalize without a product decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchWeights {
    pub specialization: f64,
    pub approach: f64,
    pub availability: f64,
    pub preference: f64,
    pub budget: f64,
    pub rating: f64,
}

impl MatchWeights {
    pub fn total(&self) -> f64 {
        self.specialization + self.approach + self.availability + self.preference + self.budget + self.rating
    }
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            specialization: 0.25,
            approach: 0.20,
            availability: 0.15,
            preference: 0.15,
            budget: 0.10,
            rating: 0.10,
        }
    }
}

/// Multiplier applied to the weighted sum per urgency level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UrgencyMultipliers {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub crisis: f64,
}

impl UrgencyMultipliers {
    pub fn for_level(&self, level: UrgencyLevel) -> f64 {
        match level {
            UrgencyLevel::Low => self.low,
            UrgencyLevel::Medium => self.medium,
            UrgencyLevel::High => self.high,
            UrgencyLevel::Crisis => self.crisis,
        }
    }
}

impl Default for UrgencyMultipliers {
    fn default() -> Self {
        Self {
            low: 1.0,
            medium: 1.05,
            high: 1.1,
            crisis: 1.2,
        }
    }
}
