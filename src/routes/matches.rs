use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::config::MatchingSettings;
use crate::models::catalog::{SPECIALIZATIONS, THERAPY_APPROACHES};
use crate::models::{
    CatalogEntry, CatalogResponse, ClientPreferences, ErrorResponse, FindMatchesRequest,
    FindMatchesResponse, HealthResponse, SavePreferencesRequest, SavePreferencesResponse,
    TherapistDetailResponse, UrgencyLevel,
};
use crate::services::{MatchRepository, MatchingEngine, RepositoryError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: MatchingEngine,
    pub repository: Arc<dyn MatchRepository>,
    pub matching: MatchingSettings,
}

impl AppState {
    pub fn new(repository: Arc<dyn MatchRepository>, engine: MatchingEngine, matching: MatchingSettings) -> Self {
        Self {
            engine,
            repository,
            matching,
        }
    }
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches/find", web::post().to(find_matches))
        .route("/preferences", web::put().to(save_preferences))
        .route(
            "/clients/{client_id}/therapists/{therapist_id}",
            web::get().to(therapist_detail),
        )
        .route("/catalog", web::get().to(catalog));
}

fn validation_error(errors: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

fn storage_error(context: &str, err: RepositoryError) -> HttpResponse {
    if let RepositoryError::NotFound(what) = &err {
        return HttpResponse::NotFound().json(ErrorResponse {
            error: context.to_string(),
            message: format!("Not found: {}", what),
            status_code: 404,
        });
    }

    tracing::error!("{}: {}", context, err);
    HttpResponse::InternalServerError().json(ErrorResponse {
        error: context.to_string(),
        message: err.to_string(),
        status_code: 500,
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let storage_healthy = state.repository.health_check().await.unwrap_or(false);

    let status = if storage_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Find matches endpoint
///
/// POST /api/v1/matches/find
///
/// Request body:
/// ```json
/// {
///   "clientId": "string",
///   "limit": 10
/// }
/// ```
async fn find_matches(
    state: web::Data<AppState>,
    req: web::Json<FindMatchesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find_matches request: {:?}", errors);
        return validation_error(errors);
    }

    let client_id = &req.client_id;
    let limit = state.matching.resolve_limit(req.limit);

    tracing::info!("Finding matches for client: {}, limit: {}", client_id, limit);

    match state.engine.find_matches(client_id, limit).await {
        Ok(ranked) => HttpResponse::Ok().json(FindMatchesResponse {
            client_id: client_id.clone(),
            mode: ranked.mode,
            total_results: ranked.total_candidates,
            matches: ranked.matches,
        }),
        Err(e) => storage_error("Failed to find matches", e),
    }
}

/// Save preferences endpoint
///
/// PUT /api/v1/preferences
///
/// Creates the client's preference record or replaces it wholesale.
async fn save_preferences(
    state: web::Data<AppState>,
    req: web::Json<SavePreferencesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let preferences = ClientPreferences::from(req.into_inner());

    match state.repository.save_preferences(&preferences).await {
        Ok(saved) => {
            tracing::info!("Saved preferences for client {}", saved.client_id);
            HttpResponse::Ok().json(SavePreferencesResponse {
                success: true,
                client_id: saved.client_id,
            })
        }
        Err(e) => storage_error("Failed to save preferences", e),
    }
}

/// Therapist detail endpoint
///
/// GET /api/v1/clients/{client_id}/therapists/{therapist_id}
///
/// Returns the profile and the score last computed for this pair, if any.
async fn therapist_detail(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (client_id, therapist_id) = path.into_inner();

    let therapist = match state.repository.get_therapist(&therapist_id).await {
        Ok(Some(therapist)) => therapist,
        Ok(None) => {
            let missing = RepositoryError::NotFound(format!("therapist {}", therapist_id));
            return storage_error("Therapist not found", missing);
        }
        Err(e) => return storage_error("Failed to fetch therapist", e),
    };

    let matching_score = match state.repository.get_score(&client_id, &therapist_id).await {
        Ok(score) => score,
        Err(e) => return storage_error("Failed to fetch score", e),
    };

    HttpResponse::Ok().json(TherapistDetailResponse {
        therapist,
        matching_score,
    })
}

/// Catalog endpoint
///
/// GET /api/v1/catalog
async fn catalog() -> impl Responder {
    HttpResponse::Ok().json(build_catalog())
}

fn entries(table: &[(&str, &str)]) -> Vec<CatalogEntry> {
    table
        .iter()
        .map(|(code, label)| CatalogEntry {
            code: code.to_string(),
            label: label.to_string(),
        })
        .collect()
}

pub fn build_catalog() -> CatalogResponse {
    CatalogResponse {
        specializations: entries(SPECIALIZATIONS),
        therapy_approaches: entries(THERAPY_APPROACHES),
        urgency_levels: UrgencyLevel::ALL
            .iter()
            .map(|level| CatalogEntry {
                code: level.as_str().to_string(),
                label: level.description().to_string(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Matcher;
    use crate::models::{CompatibilityScore, MatchingScore, TagSet, TherapistAvailability, TherapistProfile};
    use crate::services::InMemoryRepository;
    use actix_web::{http::StatusCode, test as actix_test, App};

    async fn create_state() -> (AppState, Arc<InMemoryRepository>) {
        let repo = Arc::new(InMemoryRepository::new());
        repo.insert_therapist(TherapistProfile {
            therapist_id: "t1".to_string(),
            name: "Dr. Rivera".to_string(),
            specializations: ["anxiety"].iter().map(|s| s.to_string()).collect(),
            therapy_approaches: TagSet::new(),
            availability: TherapistAvailability::default(),
            years_of_experience: 11,
            languages: TagSet::new(),
            rate_per_session: 120.0,
            accepts_insurance: true,
            rating: 4.7,
            total_reviews: 30,
            is_accepting_clients: true,
            is_active: true,
            created_at: None,
        })
        .await;

        let shared: Arc<dyn MatchRepository> = repo.clone();
        let engine = MatchingEngine::new(shared.clone(), Matcher::with_default_weights());
        (AppState::new(shared, engine, MatchingSettings::default()), repo)
    }

    #[test]
    fn test_catalog_contents() {
        let catalog = build_catalog();
        assert_eq!(catalog.specializations.len(), SPECIALIZATIONS.len());
        assert_eq!(catalog.therapy_approaches[0].code, "cbt");
        assert_eq!(catalog.urgency_levels.len(), 4);
        assert_eq!(catalog.urgency_levels[3].label, "Need immediate support");
    }

    #[actix_web::test]
    async fn test_find_matches_basic_then_full() {
        let (state, repo) = create_state().await;
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/matches/find")
            .set_json(serde_json::json!({ "clientId": "c1" }))
            .to_request();
        let body: FindMatchesResponse = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.mode, crate::models::MatchMode::Basic);
        assert_eq!(repo.score_count().await, 0);

        let req = actix_test::TestRequest::put()
            .uri("/preferences")
            .set_json(serde_json::json!({
                "clientId": "c1",
                "specializations": ["anxiety"],
                "urgency": "high"
            }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = actix_test::TestRequest::post()
            .uri("/matches/find")
            .set_json(serde_json::json!({ "clientId": "c1", "limit": 5 }))
            .to_request();
        let body: FindMatchesResponse = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.mode, crate::models::MatchMode::Full);
        assert_eq!(body.matches.len(), 1);
        assert_eq!(body.matches[0].breakdown.specialization, 1.0);
        assert_eq!(repo.score_count().await, 1);

        let req = actix_test::TestRequest::get()
            .uri("/clients/c1/therapists/t1")
            .to_request();
        let detail: TherapistDetailResponse = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(detail.therapist.name, "Dr. Rivera");
        assert_eq!(
            detail.matching_score.map(|s| s.overall_score),
            Some(body.matches[0].score)
        );
    }

    #[actix_web::test]
    async fn test_find_matches_rejects_empty_client() {
        let (state, _) = create_state().await;
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/matches/find")
            .set_json(serde_json::json!({ "clientId": "" }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_unknown_therapist_is_404() {
        let (state, _) = create_state().await;
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/clients/c1/therapists/missing")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    /// Serves profiles from memory but cannot read stored scores
    struct ScoreStoreDown {
        inner: InMemoryRepository,
    }

    #[async_trait::async_trait]
    impl MatchRepository for ScoreStoreDown {
        async fn get_preferences(&self, client_id: &str) -> Result<Option<ClientPreferences>, RepositoryError> {
            self.inner.get_preferences(client_id).await
        }

        async fn list_eligible_therapists(&self) -> Result<Vec<TherapistProfile>, RepositoryError> {
            self.inner.list_eligible_therapists().await
        }

        async fn upsert_score(
            &self,
            client_id: &str,
            therapist_id: &str,
            score: &CompatibilityScore,
        ) -> Result<MatchingScore, RepositoryError> {
            self.inner.upsert_score(client_id, therapist_id, score).await
        }

        async fn save_preferences(&self, preferences: &ClientPreferences) -> Result<ClientPreferences, RepositoryError> {
            self.inner.save_preferences(preferences).await
        }

        async fn get_therapist(&self, therapist_id: &str) -> Result<Option<TherapistProfile>, RepositoryError> {
            self.inner.get_therapist(therapist_id).await
        }

        async fn get_score(&self, _client_id: &str, _therapist_id: &str) -> Result<Option<MatchingScore>, RepositoryError> {
            Err(RepositoryError::InvalidData("connection reset".to_string()))
        }

        async fn health_check(&self) -> Result<bool, RepositoryError> {
            Ok(false)
        }
    }

    #[actix_web::test]
    async fn test_detail_score_read_failure_is_500() {
        let (_, memory) = create_state().await;
        let therapist = memory.get_therapist("t1").await.unwrap().unwrap();

        let inner = InMemoryRepository::new();
        inner.insert_therapist(therapist).await;
        let repo: Arc<dyn MatchRepository> = Arc::new(ScoreStoreDown { inner });
        let engine = MatchingEngine::new(repo.clone(), Matcher::with_default_weights());
        let state = AppState::new(repo, engine, MatchingSettings::default());

        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/clients/c1/therapists/t1")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: ErrorResponse = actix_test::read_body_json(resp).await;
        assert_eq!(body.status_code, 500);
        assert_eq!(body.error, "Failed to fetch score");
    }
}
