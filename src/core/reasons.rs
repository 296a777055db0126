use crate::core::overlap::shared_tags;
use crate::models::catalog::{approach_label, specialization_label};
use crate::models::{ClientPreferences, TherapistProfile};

/// Maximum number of reasons attached to a match
pub const MAX_REASONS: usize = 4;

const VETERAN_YEARS: u32 = 10;
const HIGHLY_RATED: f64 = 4.5;

/// Build the human-readable reasons shown next to a match
///
/// Candidates are checked in a fixed priority order and collection stops at
/// `MAX_REASONS`.
pub fn generate_match_reasons(
    preferences: &ClientPreferences,
    profile: &TherapistProfile,
) -> Vec<String> {
    let mut reasons = Vec::with_capacity(MAX_REASONS);

    let specializations = shared_tags(&preferences.preferred_specializations, &profile.specializations);
    if !specializations.is_empty() {
        let names: Vec<&str> = specializations.into_iter().map(specialization_label).collect();
        reasons.push(format!("Specializes in {}", names.join(", ")));
    }

    let approaches = shared_tags(&preferences.preferred_approaches, &profile.therapy_approaches);
    if !approaches.is_empty() {
        let names: Vec<&str> = approaches.into_iter().map(approach_label).collect();
        reasons.push(format!("Uses {} approach", names.join(", ")));
    }

    if profile.years_of_experience >= VETERAN_YEARS {
        reasons.push(format!("{}+ years of experience", profile.years_of_experience));
    }

    if preferences.has_insurance() && profile.accepts_insurance {
        reasons.push("Accepts your insurance".to_string());
    }

    if profile.rating >= HIGHLY_RATED {
        reasons.push(format!("Highly rated ({:.1}/5.0)", profile.rating));
    }

    let languages = shared_tags(&preferences.preferred_languages, &profile.languages);
    if !languages.is_empty() {
        reasons.push(format!("Speaks {}", languages.join(", ")));
    }

    reasons.truncate(MAX_REASONS);
    reasons
}

/// Reasons for a basic (no preferences) match: experience and rating only
pub fn basic_match_reasons(profile: &TherapistProfile) -> Vec<String> {
    let rating = if profile.rating > 0.0 {
        format!("Rated {:.1}/5.0", profile.rating)
    } else {
        "New therapist".to_string()
    };

    vec![
        format!("{}+ years experience", profile.years_of_experience),
        rating,
    ]
}
