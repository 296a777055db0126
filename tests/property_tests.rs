// Property tests for scoring bounds and ranking order

use mindbridge_match::core::scoring::calculate_breakdown;
use mindbridge_match::core::{rank_matches, Matcher};
use mindbridge_match::models::{
    ClientPreferences, TagSet, TherapistAvailability, TherapistProfile, UrgencyLevel,
};
use proptest::prelude::*;

const SPECIALIZATIONS: &[&str] = &["anxiety", "depression", "trauma", "grief", "relationships", "addiction"];
const APPROACHES: &[&str] = &["cbt", "dbt", "emdr", "mindfulness", "psychodynamic"];
const TIMES: &[&str] = &["morning", "afternoon", "evening", "weekend"];
const LANGUAGES: &[&str] = &["english", "spanish", "french"];

fn tag_set(pool: &'static [&'static str]) -> impl Strategy<Value = TagSet> {
    proptest::sample::subsequence(pool, 0..=pool.len())
        .prop_map(|items| items.into_iter().map(str::to_string).collect())
}

fn urgency() -> impl Strategy<Value = UrgencyLevel> {
    prop_oneof![
        Just(UrgencyLevel::Low),
        Just(UrgencyLevel::Medium),
        Just(UrgencyLevel::High),
        Just(UrgencyLevel::Crisis),
    ]
}

prop_compose! {
    fn preferences()(
        specializations in tag_set(SPECIALIZATIONS),
        approaches in tag_set(APPROACHES),
        times in tag_set(TIMES),
        languages in tag_set(LANGUAGES),
        budget in proptest::option::of(-50.0f64..400.0),
        insured in any::<bool>(),
        gender in proptest::option::of(Just("female".to_string())),
        age in proptest::option::of(Just("30-45".to_string())),
        urgency in urgency(),
    ) -> ClientPreferences {
        let mut prefs = ClientPreferences::new("client");
        prefs.preferred_specializations = specializations;
        prefs.preferred_approaches = approaches;
        prefs.preferred_times = times;
        prefs.preferred_languages = languages;
        prefs.budget_max = budget;
        prefs.insurance_provider = insured.then(|| "Aetna".to_string());
        prefs.gender_preference = gender;
        prefs.age_preference = age;
        prefs.urgency = urgency;
        prefs
    }
}

prop_compose! {
    fn therapist()(
        id in 0u32..10_000,
        specializations in tag_set(SPECIALIZATIONS),
        approaches in tag_set(APPROACHES),
        times in tag_set(TIMES),
        languages in tag_set(LANGUAGES),
        years in 0u32..40,
        rate in 0.0f64..500.0,
        accepts_insurance in any::<bool>(),
        rating in -1.0f64..7.0,
    ) -> TherapistProfile {
        TherapistProfile {
            therapist_id: format!("t{}", id),
            name: format!("Therapist {}", id),
            specializations,
            therapy_approaches: approaches,
            availability: TherapistAvailability::with_times(times),
            years_of_experience: years,
            languages,
            rate_per_session: rate,
            accepts_insurance,
            rating,
            total_reviews: 0,
            is_accepting_clients: true,
            is_active: true,
            created_at: None,
        }
    }
}

proptest! {
    #[test]
    fn sub_scores_stay_in_unit_interval(prefs in preferences(), profile in therapist()) {
        let breakdown = calculate_breakdown(&prefs, &profile);

        for value in [
            breakdown.specialization,
            breakdown.approach,
            breakdown.availability,
            breakdown.preference,
            breakdown.budget,
            breakdown.rating,
        ] {
            prop_assert!((0.0..=1.0).contains(&value), "sub-score out of range: {}", value);
        }
    }

    #[test]
    fn overall_bounded_by_weights_and_multiplier(prefs in preferences(), profile in therapist()) {
        let score = Matcher::default().score(&prefs, &profile);

        prop_assert!(score.overall >= 0.0);
        // 0.95 weight sum times the crisis multiplier, plus rounding slack
        prop_assert!(score.overall <= 1.1405);
    }

    #[test]
    fn scoring_is_deterministic(prefs in preferences(), profile in therapist()) {
        let matcher = Matcher::default();
        prop_assert_eq!(matcher.score(&prefs, &profile), matcher.score(&prefs, &profile));
    }

    #[test]
    fn ranking_is_sorted_and_truncated(
        prefs in preferences(),
        pool in proptest::collection::vec(therapist(), 0..25),
        limit in 0usize..30,
    ) {
        let matcher = Matcher::default();
        let scored = matcher.score_candidates(&prefs, pool.clone());
        let ranked = rank_matches(scored, limit);

        prop_assert!(ranked.len() <= limit.max(1));
        prop_assert_eq!(ranked.len(), pool.len().min(limit.max(1)));
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }
}
