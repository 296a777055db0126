use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::time::Duration;
use uuid::Uuid;

use crate::models::{
    ClientPreferences, CompatibilityScore, MatchingScore, TagSet, TherapistAvailability,
    TherapistProfile, UrgencyLevel,
};
use crate::services::repository::{MatchRepository, RepositoryError};

/// Urgency as stored in the `urgency_level` enum column
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "urgency_level", rename_all = "lowercase")]
pub enum PgUrgency {
    Low,
    Medium,
    High,
    Crisis,
}

impl From<UrgencyLevel> for PgUrgency {
    fn from(value: UrgencyLevel) -> Self {
        match value {
            UrgencyLevel::Low => PgUrgency::Low,
            UrgencyLevel::Medium => PgUrgency::Medium,
            UrgencyLevel::High => PgUrgency::High,
            UrgencyLevel::Crisis => PgUrgency::Crisis,
        }
    }
}

impl From<PgUrgency> for UrgencyLevel {
    fn from(value: PgUrgency) -> Self {
        match value {
            PgUrgency::Low => UrgencyLevel::Low,
            PgUrgency::Medium => UrgencyLevel::Medium,
            PgUrgency::High => UrgencyLevel::High,
            PgUrgency::Crisis => UrgencyLevel::Crisis,
        }
    }
}

const THERAPIST_COLUMNS: &str = r#"
    t.user_id,
    a.full_name,
    t.specializations,
    t.therapy_approaches,
    t.availability,
    t.years_of_experience,
    t.languages_spoken,
    t.rate_per_session::float8 AS rate_per_session,
    t.accepts_insurance,
    t.rating,
    t.total_reviews,
    t.is_accepting_clients,
    a.is_active,
    t.created_at
"#;

const PREFERENCE_COLUMNS: &str = r#"
    user_id,
    concerns,
    preferred_specializations,
    preferred_therapy_approaches,
    preferred_times,
    therapist_gender_preference,
    age_preference,
    preferred_languages,
    budget_max::float8 AS budget_max,
    insurance_provider,
    session_frequency,
    urgency,
    previous_therapy_experience,
    created_at,
    updated_at
"#;

const SCORE_COLUMNS: &str = r#"
    id,
    client_id,
    therapist_id,
    overall_score,
    specialization_score,
    approach_score,
    availability_score,
    preference_score,
    budget_score,
    created_at,
    updated_at
"#;

/// PostgreSQL-backed match repository
///
/// Reads preferences and therapist profiles, and keeps exactly one
/// `matching_scores` row per (client, therapist) pair.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Connect and run pending migrations
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a repository from optional pool settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, RepositoryError> {
        let max_connections = max_connections.unwrap_or(10);
        tracing::info!("Connecting to PostgreSQL (max {} connections)", max_connections);

        Self::new(
            url,
            max_connections,
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Wrap an existing pool (migrations are the caller's responsibility)
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn tags(row: &PgRow, column: &str) -> Result<TagSet, RepositoryError> {
    let values: Vec<String> = row.try_get(column)?;
    Ok(values.into_iter().collect())
}

fn tag_vec(tags: &TagSet) -> Vec<String> {
    tags.iter().cloned().collect()
}

fn non_negative(row: &PgRow, column: &str) -> Result<u32, RepositoryError> {
    let value: i32 = row.try_get(column)?;
    u32::try_from(value)
        .map_err(|_| RepositoryError::InvalidData(format!("{} is negative: {}", column, value)))
}

fn therapist_from_row(row: &PgRow) -> Result<TherapistProfile, RepositoryError> {
    let availability: Json<TherapistAvailability> = row.try_get("availability")?;

    Ok(TherapistProfile {
        therapist_id: row.try_get("user_id")?,
        name: row.try_get("full_name")?,
        specializations: tags(row, "specializations")?,
        therapy_approaches: tags(row, "therapy_approaches")?,
        availability: availability.0,
        years_of_experience: non_negative(row, "years_of_experience")?,
        languages: tags(row, "languages_spoken")?,
        rate_per_session: row.try_get("rate_per_session")?,
        accepts_insurance: row.try_get("accepts_insurance")?,
        rating: row.try_get("rating")?,
        total_reviews: non_negative(row, "total_reviews")?,
        is_accepting_clients: row.try_get("is_accepting_clients")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}

fn preferences_from_row(row: &PgRow) -> Result<ClientPreferences, RepositoryError> {
    let urgency: PgUrgency = row.try_get("urgency")?;

    let preferences = ClientPreferences {
        client_id: row.try_get("user_id")?,
        concerns: tags(row, "concerns")?,
        preferred_specializations: tags(row, "preferred_specializations")?,
        preferred_approaches: tags(row, "preferred_therapy_approaches")?,
        preferred_times: tags(row, "preferred_times")?,
        gender_preference: row.try_get("therapist_gender_preference")?,
        age_preference: row.try_get("age_preference")?,
        preferred_languages: tags(row, "preferred_languages")?,
        budget_max: row.try_get("budget_max")?,
        insurance_provider: row.try_get("insurance_provider")?,
        session_frequency: row.try_get("session_frequency")?,
        urgency: urgency.into(),
        previous_therapy_experience: row.try_get("previous_therapy_experience")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    };

    Ok(preferences.normalized())
}

fn score_from_row(row: &PgRow) -> Result<MatchingScore, RepositoryError> {
    Ok(MatchingScore {
        id: row.try_get("id")?,
        client_id: row.try_get("client_id")?,
        therapist_id: row.try_get("therapist_id")?,
        overall_score: row.try_get("overall_score")?,
        specialization_score: row.try_get("specialization_score")?,
        approach_score: row.try_get("approach_score")?,
        availability_score: row.try_get("availability_score")?,
        preference_score: row.try_get("preference_score")?,
        budget_score: row.try_get("budget_score")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl MatchRepository for PostgresRepository {
    async fn get_preferences(&self, client_id: &str) -> Result<Option<ClientPreferences>, RepositoryError> {
        let query = format!(
            "SELECT {} FROM client_preferences WHERE user_id = $1",
            PREFERENCE_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(client_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(preferences_from_row).transpose()
    }

    async fn list_eligible_therapists(&self) -> Result<Vec<TherapistProfile>, RepositoryError> {
        let query = format!(
            r#"
            SELECT {}
            FROM therapist_profiles t
            JOIN accounts a ON a.id = t.user_id
            WHERE t.is_accepting_clients AND a.is_active
            ORDER BY t.created_at, t.user_id
            "#,
            THERAPIST_COLUMNS
        );

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        let therapists = rows
            .iter()
            .map(therapist_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Loaded {} eligible therapists", therapists.len());

        Ok(therapists)
    }

    /// Uses INSERT ... ON CONFLICT so a pair keeps its id and creation time
    async fn upsert_score(
        &self,
        client_id: &str,
        therapist_id: &str,
        score: &CompatibilityScore,
    ) -> Result<MatchingScore, RepositoryError> {
        let query = format!(
            r#"
            INSERT INTO matching_scores (
                id, client_id, therapist_id, overall_score, specialization_score,
                approach_score, availability_score, preference_score, budget_score,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW(), NOW())
            ON CONFLICT (client_id, therapist_id)
            DO UPDATE SET
                overall_score = EXCLUDED.overall_score,
                specialization_score = EXCLUDED.specialization_score,
                approach_score = EXCLUDED.approach_score,
                availability_score = EXCLUDED.availability_score,
                preference_score = EXCLUDED.preference_score,
                budget_score = EXCLUDED.budget_score,
                updated_at = NOW()
            RETURNING {}
            "#,
            SCORE_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(client_id)
            .bind(therapist_id)
            .bind(score.overall)
            .bind(score.breakdown.specialization)
            .bind(score.breakdown.approach)
            .bind(score.breakdown.availability)
            .bind(score.breakdown.preference)
            .bind(score.breakdown.budget)
            .fetch_one(&self.pool)
            .await?;

        tracing::trace!(
            "Upserted score {} -> {}: {:.3}",
            client_id,
            therapist_id,
            score.overall
        );

        score_from_row(&row)
    }

    async fn save_preferences(&self, preferences: &ClientPreferences) -> Result<ClientPreferences, RepositoryError> {
        let query = format!(
            r#"
            INSERT INTO client_preferences (
                user_id, concerns, preferred_specializations, preferred_therapy_approaches,
                preferred_times, therapist_gender_preference, age_preference,
                preferred_languages, budget_max, insurance_provider, session_frequency,
                urgency, previous_therapy_experience, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, CAST($9 AS NUMERIC), $10, $11, $12, $13, NOW(), NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET
                concerns = EXCLUDED.concerns,
                preferred_specializations = EXCLUDED.preferred_specializations,
                preferred_therapy_approaches = EXCLUDED.preferred_therapy_approaches,
                preferred_times = EXCLUDED.preferred_times,
                therapist_gender_preference = EXCLUDED.therapist_gender_preference,
                age_preference = EXCLUDED.age_preference,
                preferred_languages = EXCLUDED.preferred_languages,
                budget_max = EXCLUDED.budget_max,
                insurance_provider = EXCLUDED.insurance_provider,
                session_frequency = EXCLUDED.session_frequency,
                urgency = EXCLUDED.urgency,
                previous_therapy_experience = EXCLUDED.previous_therapy_experience,
                updated_at = NOW()
            RETURNING {}
            "#,
            PREFERENCE_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(&preferences.client_id)
            .bind(tag_vec(&preferences.concerns))
            .bind(tag_vec(&preferences.preferred_specializations))
            .bind(tag_vec(&preferences.preferred_approaches))
            .bind(tag_vec(&preferences.preferred_times))
            .bind(preferences.gender_preference())
            .bind(preferences.age_preference())
            .bind(tag_vec(&preferences.preferred_languages))
            .bind(preferences.budget())
            .bind(preferences.insurance_provider())
            .bind(&preferences.session_frequency)
            .bind(PgUrgency::from(preferences.urgency))
            .bind(preferences.previous_therapy_experience)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!("Saved preferences for client {}", preferences.client_id);

        preferences_from_row(&row)
    }

    async fn get_therapist(&self, therapist_id: &str) -> Result<Option<TherapistProfile>, RepositoryError> {
        let query = format!(
            r#"
            SELECT {}
            FROM therapist_profiles t
            JOIN accounts a ON a.id = t.user_id
            WHERE t.user_id = $1
            "#,
            THERAPIST_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(therapist_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(therapist_from_row).transpose()
    }

    async fn get_score(&self, client_id: &str, therapist_id: &str) -> Result<Option<MatchingScore>, RepositoryError> {
        let query = format!(
            "SELECT {} FROM matching_scores WHERE client_id = $1 AND therapist_id = $2",
            SCORE_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(client_id)
            .bind(therapist_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(score_from_row).transpose()
    }

    async fn health_check(&self) -> Result<bool, RepositoryError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
