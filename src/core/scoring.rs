use crate::core::overlap::{has_overlap, overlap_ratio};
use crate::models::{
    ClientPreferences, CompatibilityScore, MatchWeights, ScoreBreakdown, TagSet,
    TherapistAvailability, TherapistProfile, UrgencyMultipliers,
};

/// Constants for a tag-overlap factor
///
/// score = min(base + slope * overlap_ratio, 1.0) when the sets intersect,
/// otherwise one of the fixed fallbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapTiers {
    pub client_empty: f64,
    pub therapist_empty: f64,
    pub no_overlap: f64,
    pub base: f64,
    pub slope: f64,
}

pub const SPECIALIZATION_TIERS: OverlapTiers = OverlapTiers {
    client_empty: 0.8,
    therapist_empty: 0.3,
    no_overlap: 0.2,
    base: 0.2,
    slope: 0.8,
};

pub const APPROACH_TIERS: OverlapTiers = OverlapTiers {
    client_empty: 0.7,
    therapist_empty: 0.4,
    no_overlap: 0.3,
    base: 0.3,
    slope: 0.7,
};

const AVAILABILITY_NEUTRAL: f64 = 0.6;
const AVAILABILITY_NO_PREFERRED_TIMES: f64 = 0.5;
const AVAILABILITY_TIERS: OverlapTiers = OverlapTiers {
    client_empty: AVAILABILITY_NEUTRAL,
    therapist_empty: AVAILABILITY_NO_PREFERRED_TIMES,
    no_overlap: 0.3,
    base: 0.4,
    slope: 0.6,
};

/// Gender is not recorded on therapist profiles, so a stated gender
/// preference always contributes this neutral value.
const GENDER_PLACEHOLDER: f64 = 0.7;
const LANGUAGE_MATCH: f64 = 1.0;
const LANGUAGE_MISMATCH: f64 = 0.3;
const SEASONED_THERAPIST_YEARS: u32 = 5;
const AGE_SEASONED: f64 = 0.8;
const AGE_JUNIOR: f64 = 0.6;
const PREFERENCE_NEUTRAL: f64 = 0.7;

const BUDGET_INSURED: f64 = 1.0;
const BUDGET_NEUTRAL: f64 = 0.6;

/// Score a tag-overlap factor against its tier constants
#[inline]
pub fn tiered_overlap_score(desired: &TagSet, offered: &TagSet, tiers: &OverlapTiers) -> f64 {
    if desired.is_empty() {
        return tiers.client_empty;
    }

    if offered.is_empty() {
        return tiers.therapist_empty;
    }

    if !has_overlap(desired, offered) {
        return tiers.no_overlap;
    }

    (tiers.base + tiers.slope * overlap_ratio(desired, offered)).min(1.0)
}

/// How well the therapist's specializations cover what the client asked for
#[inline]
pub fn specialization_score(desired: &TagSet, offered: &TagSet) -> f64 {
    tiered_overlap_score(desired, offered, &SPECIALIZATION_TIERS)
}

/// Therapy approach compatibility
#[inline]
pub fn approach_score(desired: &TagSet, offered: &TagSet) -> f64 {
    tiered_overlap_score(desired, offered, &APPROACH_TIERS)
}

/// Scheduling compatibility between client time slots and therapist availability
///
/// An availability record with nothing published is neutral; one with a
/// weekly schedule but no preferred-time list scores slightly lower.
#[inline]
pub fn availability_score(client_times: &TagSet, availability: &TherapistAvailability) -> f64 {
    if client_times.is_empty() || availability.is_empty() {
        return AVAILABILITY_NEUTRAL;
    }

    tiered_overlap_score(client_times, &availability.preferred_times, &AVAILABILITY_TIERS)
}

/// Average over the personal preferences the client actually stated
///
/// Unstated factors are skipped, not scored as zero.
pub fn preference_score(preferences: &ClientPreferences, profile: &TherapistProfile) -> f64 {
    let mut score = 0.0;
    let mut factors = 0u32;

    if preferences.gender_preference().is_some() {
        factors += 1;
        score += GENDER_PLACEHOLDER;
    }

    if !preferences.preferred_languages.is_empty() {
        factors += 1;
        score += if has_overlap(&preferences.preferred_languages, &profile.languages) {
            LANGUAGE_MATCH
        } else {
            LANGUAGE_MISMATCH
        };
    }

    if preferences.age_preference().is_some() {
        factors += 1;
        score += if profile.years_of_experience >= SEASONED_THERAPIST_YEARS {
            AGE_SEASONED
        } else {
            AGE_JUNIOR
        };
    }

    if factors == 0 {
        return PREFERENCE_NEUTRAL;
    }

    score / factors as f64
}

/// Budget and insurance compatibility
///
/// Insurance coverage wins outright. Within budget, cheaper is better but
/// never below 0.7; over budget decays towards a floor of 0.1.
#[inline]
pub fn budget_score(budget: Option<f64>, rate: f64, has_insurance: bool, accepts_insurance: bool) -> f64 {
    if has_insurance && accepts_insurance {
        return BUDGET_INSURED;
    }

    let budget = match budget {
        Some(b) if b > 0.0 => b,
        _ => return BUDGET_NEUTRAL,
    };

    if rate <= budget {
        1.0 - 0.3 * (rate / budget)
    } else {
        let over_ratio = (rate - budget) / budget;
        (0.5 - 0.4 * over_ratio).max(0.1)
    }
}

/// Average rating mapped onto [0, 1]
#[inline]
pub fn rating_score(rating: f64) -> f64 {
    (rating / 5.0).clamp(0.0, 1.0)
}

/// Weighted sum of the sub-scores
///
/// The default weights sum to 0.95; the sum is not renormalized.
#[inline]
pub fn weighted_sum(breakdown: &ScoreBreakdown, weights: &MatchWeights) -> f64 {
    breakdown.specialization * weights.specialization
        + breakdown.approach * weights.approach
        + breakdown.availability * weights.availability
        + breakdown.preference * weights.preference
        + breakdown.budget * weights.budget
        + breakdown.rating * weights.rating
}

/// Boost a weighted sum by the urgency multiplier. The result is not clamped.
#[inline]
pub fn apply_urgency(weighted: f64, multiplier: f64) -> f64 {
    weighted * multiplier
}

/// Round to 3 decimal places
#[inline]
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Compute every sub-score for a client/therapist pair
pub fn calculate_breakdown(preferences: &ClientPreferences, profile: &TherapistProfile) -> ScoreBreakdown {
    ScoreBreakdown {
        specialization: specialization_score(
            &preferences.preferred_specializations,
            &profile.specializations,
        ),
        approach: approach_score(&preferences.preferred_approaches, &profile.therapy_approaches),
        availability: availability_score(&preferences.preferred_times, &profile.availability),
        preference: preference_score(preferences, profile),
        budget: budget_score(
            preferences.budget(),
            profile.rate_per_session,
            preferences.has_insurance(),
            profile.accepts_insurance,
        ),
        rating: rating_score(profile.rating),
    }
}

/// Calculate the compatibility score for a client/therapist pair
///
/// overall = weighted_sum(sub-scores) * urgency_multiplier, computed from the
/// unrounded sub-scores; every reported value is then rounded to 3 places.
pub fn calculate_compatibility(
    preferences: &ClientPreferences,
    profile: &TherapistProfile,
    weights: &MatchWeights,
    urgency: &UrgencyMultipliers,
) -> CompatibilityScore {
    let breakdown = calculate_breakdown(preferences, profile);
    let overall = apply_urgency(
        weighted_sum(&breakdown, weights),
        urgency.for_level(preferences.urgency),
    );

    CompatibilityScore {
        overall: round3(overall),
        breakdown: ScoreBreakdown {
            specialization: round3(breakdown.specialization),
            approach: round3(breakdown.approach),
            availability: round3(breakdown.availability),
            preference: round3(breakdown.preference),
            budget: round3(breakdown.budget),
            rating: round3(breakdown.rating),
        },
    }
}
