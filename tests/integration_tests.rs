// Integration tests for the matching engine against the in-memory repository

use mindbridge_match::core::Matcher;
use mindbridge_match::models::{
    ClientPreferences, MatchMode, TagSet, TherapistAvailability, TherapistProfile, UrgencyLevel,
    NEUTRAL_SCORE,
};
use mindbridge_match::services::{InMemoryRepository, MatchRepository, MatchingEngine};
use std::sync::Arc;

fn tags(items: &[&str]) -> TagSet {
    items.iter().map(|s| s.to_string()).collect()
}

fn create_therapist(id: &str, specializations: &[&str], rating: f64, years: u32) -> TherapistProfile {
    TherapistProfile {
        therapist_id: id.to_string(),
        name: format!("Therapist {}", id),
        specializations: tags(specializations),
        therapy_approaches: tags(&["cbt"]),
        availability: TherapistAvailability::with_times(["morning", "evening"]),
        years_of_experience: years,
        languages: tags(&["english"]),
        rate_per_session: 90.0,
        accepts_insurance: false,
        rating,
        total_reviews: 8,
        is_accepting_clients: true,
        is_active: true,
        created_at: None,
    }
}

fn create_preferences(client_id: &str) -> ClientPreferences {
    let mut prefs = ClientPreferences::new(client_id);
    prefs.preferred_specializations = tags(&["anxiety", "trauma"]);
    prefs.preferred_approaches = tags(&["cbt"]);
    prefs.preferred_times = tags(&["morning"]);
    prefs.preferred_languages = tags(&["english"]);
    prefs.budget_max = Some(100.0);
    prefs.urgency = UrgencyLevel::Medium;
    prefs
}

async fn setup(therapists: Vec<TherapistProfile>) -> (MatchingEngine, Arc<InMemoryRepository>) {
    let repo = Arc::new(InMemoryRepository::new());
    for therapist in therapists {
        repo.insert_therapist(therapist).await;
    }
    let engine = MatchingEngine::new(repo.clone(), Matcher::with_default_weights());
    (engine, repo)
}

#[tokio::test]
async fn test_end_to_end_full_matching() {
    let (engine, repo) = setup(vec![
        create_therapist("partial", &["anxiety"], 4.0, 5),
        create_therapist("full", &["anxiety", "trauma"], 4.0, 5),
        create_therapist("none", &["grief"], 4.0, 5),
    ])
    .await;
    repo.save_preferences(&create_preferences("c1")).await.unwrap();

    let ranked = engine.find_matches("c1", 10).await.unwrap();

    assert_eq!(ranked.mode, MatchMode::Full);
    assert_eq!(ranked.total_candidates, 3);

    let ids: Vec<&str> = ranked.matches.iter().map(|m| m.therapist.therapist_id.as_str()).collect();
    assert_eq!(ids, vec!["full", "partial", "none"]);

    for i in 1..ranked.matches.len() {
        assert!(ranked.matches[i - 1].score >= ranked.matches[i].score);
    }

    assert_eq!(ranked.matches[0].match_reasons[0], "Specializes in Anxiety Disorders, Trauma & PTSD");
}

#[tokio::test]
async fn test_scores_persisted_for_every_candidate_not_just_top_n() {
    let therapists = (0..6)
        .map(|i| create_therapist(&format!("t{}", i), &["anxiety"], 3.0 + i as f64 * 0.3, i))
        .collect();
    let (engine, repo) = setup(therapists).await;
    repo.save_preferences(&create_preferences("c1")).await.unwrap();

    let ranked = engine.find_matches("c1", 2).await.unwrap();

    assert_eq!(ranked.matches.len(), 2);
    assert_eq!(repo.score_count().await, 6);

    for m in &ranked.matches {
        let stored = repo
            .get_score("c1", &m.therapist.therapist_id)
            .await
            .unwrap()
            .expect("score should be stored");
        assert_eq!(stored.overall_score, m.score);
        assert_eq!(stored.specialization_score, m.breakdown.specialization);
        assert_eq!(stored.budget_score, m.breakdown.budget);
    }
}

#[tokio::test]
async fn test_repeated_runs_are_idempotent() {
    let (engine, repo) = setup(vec![
        create_therapist("a", &["anxiety"], 4.2, 4),
        create_therapist("b", &["trauma"], 4.8, 12),
        create_therapist("c", &[], 3.9, 1),
    ])
    .await;
    repo.save_preferences(&create_preferences("c1")).await.unwrap();

    let first = engine.find_matches("c1", 10).await.unwrap();
    let first_scores = repo.scores_for_client("c1").await;

    let second = engine.find_matches("c1", 10).await.unwrap();
    let second_scores = repo.scores_for_client("c1").await;

    let order = |r: &mindbridge_match::RankedMatches| -> Vec<String> {
        r.matches.iter().map(|m| m.therapist.therapist_id.clone()).collect()
    };
    assert_eq!(order(&first), order(&second));

    assert_eq!(first_scores.len(), 3);
    assert_eq!(second_scores.len(), 3);
    for (before, after) in first_scores.iter().zip(second_scores.iter()) {
        assert_eq!(before.id, after.id);
        assert_eq!(before.overall_score, after.overall_score);
        assert_eq!(before.preference_score, after.preference_score);
        assert_eq!(before.created_at, after.created_at);
    }
}

#[tokio::test]
async fn test_changed_preferences_overwrite_stored_score() {
    let (engine, repo) = setup(vec![create_therapist("a", &["anxiety"], 4.2, 4)]).await;

    let mut prefs = create_preferences("c1");
    prefs.urgency = UrgencyLevel::Low;
    repo.save_preferences(&prefs).await.unwrap();
    let low = engine.find_matches("c1", 10).await.unwrap();

    prefs.urgency = UrgencyLevel::Crisis;
    repo.save_preferences(&prefs).await.unwrap();
    let crisis = engine.find_matches("c1", 10).await.unwrap();

    assert!(crisis.matches[0].score > low.matches[0].score);
    assert_eq!(repo.score_count().await, 1);

    let stored = repo.get_score("c1", "a").await.unwrap().unwrap();
    assert_eq!(stored.overall_score, crisis.matches[0].score);
}

#[tokio::test]
async fn test_no_preferences_falls_back_to_basic() {
    let (engine, repo) = setup(vec![
        create_therapist("low", &["anxiety"], 3.5, 20),
        create_therapist("mid", &[], 4.2, 3),
        create_therapist("top", &[], 4.9, 2),
        create_therapist("mid-senior", &[], 4.2, 9),
    ])
    .await;

    let ranked = engine.find_matches("stranger", 3).await.unwrap();

    assert_eq!(ranked.mode, MatchMode::Basic);
    assert_eq!(ranked.matches.len(), 3);

    let ids: Vec<&str> = ranked.matches.iter().map(|m| m.therapist.therapist_id.as_str()).collect();
    assert_eq!(ids, vec!["top", "mid-senior", "mid"]);

    for m in &ranked.matches {
        assert_eq!(m.score, NEUTRAL_SCORE);
        assert_eq!(m.breakdown.specialization, NEUTRAL_SCORE);
        assert_eq!(m.breakdown.approach, NEUTRAL_SCORE);
        assert_eq!(m.breakdown.availability, NEUTRAL_SCORE);
        assert_eq!(m.breakdown.preference, NEUTRAL_SCORE);
        assert_eq!(m.breakdown.budget, NEUTRAL_SCORE);
        assert_eq!(m.match_reasons.len(), 2);
    }
    assert_eq!(ranked.matches[0].breakdown.rating, 0.98);

    // Basic mode never writes scores
    assert_eq!(repo.score_count().await, 0);
}

#[tokio::test]
async fn test_ties_keep_enumeration_order() {
    let (engine, repo) = setup(vec![
        create_therapist("first", &["grief"], 4.0, 5),
        create_therapist("best", &["anxiety", "trauma"], 4.0, 5),
        create_therapist("second", &["grief"], 4.0, 5),
    ])
    .await;
    repo.save_preferences(&create_preferences("c1")).await.unwrap();

    let ranked = engine.find_matches("c1", 10).await.unwrap();

    let ids: Vec<&str> = ranked.matches.iter().map(|m| m.therapist.therapist_id.as_str()).collect();
    assert_eq!(ids, vec!["best", "first", "second"]);
    assert_eq!(ranked.matches[1].score, ranked.matches[2].score);
}

#[tokio::test]
async fn test_ineligible_therapists_never_scored() {
    let mut closed = create_therapist("closed", &["anxiety", "trauma"], 5.0, 20);
    closed.is_accepting_clients = false;
    let mut deactivated = create_therapist("deactivated", &["anxiety", "trauma"], 5.0, 20);
    deactivated.is_active = false;

    let (engine, repo) = setup(vec![closed, deactivated, create_therapist("open", &[], 3.0, 1)]).await;
    repo.save_preferences(&create_preferences("c1")).await.unwrap();

    let ranked = engine.find_matches("c1", 10).await.unwrap();

    assert_eq!(ranked.matches.len(), 1);
    assert_eq!(ranked.matches[0].therapist.therapist_id, "open");
    assert_eq!(repo.score_count().await, 1);
}

#[tokio::test]
async fn test_empty_therapist_pool() {
    let (engine, repo) = setup(vec![]).await;
    repo.save_preferences(&create_preferences("c1")).await.unwrap();

    let ranked = engine.find_matches("c1", 10).await.unwrap();

    assert_eq!(ranked.mode, MatchMode::Full);
    assert!(ranked.matches.is_empty());
}
