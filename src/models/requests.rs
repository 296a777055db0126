use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{ClientPreferences, TagSet, UrgencyLevel};

/// Request to find therapist matches
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindMatchesRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "client_id", rename = "clientId")]
    pub client_id: String,
    #[validate(range(min = 1))]
    #[serde(default)]
    pub limit: Option<u16>,
}

/// Request to create or replace a client's preference record
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SavePreferencesRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "client_id", rename = "clientId")]
    pub client_id: String,
    #[serde(default)]
    pub concerns: TagSet,
    #[serde(default)]
    pub specializations: TagSet,
    #[serde(default)]
    pub approaches: TagSet,
    #[serde(rename = "preferredTimes", default)]
    pub preferred_times: TagSet,
    #[serde(rename = "genderPreference", default)]
    pub gender_preference: Option<String>,
    #[serde(rename = "agePreference", default)]
    pub age_preference: Option<String>,
    #[serde(default)]
    pub languages: TagSet,
    #[validate(range(exclusive_min = 0.0))]
    #[serde(rename = "budgetMax", default)]
    pub budget_max: Option<f64>,
    #[serde(rename = "insuranceProvider", default)]
    pub insurance_provider: Option<String>,
    #[serde(rename = "sessionFrequency", default)]
    pub session_frequency: Option<String>,
    #[serde(default)]
    pub urgency: UrgencyLevel,
    #[serde(rename = "previousTherapyExperience", default)]
    pub previous_therapy_experience: bool,
}

impl From<SavePreferencesRequest> for ClientPreferences {
    fn from(req: SavePreferencesRequest) -> Self {
        let mut prefs = ClientPreferences::new(req.client_id);
        prefs.concerns = req.concerns;
        prefs.preferred_specializations = req.specializations;
        prefs.preferred_approaches = req.approaches;
        prefs.preferred_times = req.preferred_times;
        prefs.gender_preference = req.gender_preference;
        prefs.age_preference = req.age_preference;
        prefs.preferred_languages = req.languages;
        prefs.budget_max = req.budget_max;
        prefs.insurance_provider = req.insurance_provider;
        if let Some(frequency) = req.session_frequency {
            prefs.session_frequency = frequency;
        }
        prefs.urgency = req.urgency;
        prefs.previous_therapy_experience = req.previous_therapy_experience;
        prefs.normalized()
    }
}
