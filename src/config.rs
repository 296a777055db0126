use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::{MatchWeights, UrgencyMultipliers};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Where match data lives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default)]
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_limit")]
    pub default_limit: u16,
    #[serde(default = "default_max_limit")]
    pub max_limit: u16,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

impl MatchingSettings {
    /// Resolve a requested limit: default when absent, then clamp to [1, max_limit]
    pub fn resolve_limit(&self, requested: Option<u16>) -> usize {
        let limit = requested.unwrap_or(self.default_limit);
        limit.clamp(1, self.max_limit.max(1)) as usize
    }
}

fn default_limit() -> u16 { 10 }
fn default_max_limit() -> u16 { 50 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
    #[serde(default)]
    pub urgency: UrgencyConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_specialization_weight")]
    pub specialization: f64,
    #[serde(default = "default_approach_weight")]
    pub approach: f64,
    #[serde(default = "default_availability_weight")]
    pub availability: f64,
    #[serde(default = "default_preference_weight")]
    pub preference: f64,
    #[serde(default = "default_budget_weight")]
    pub budget: f64,
    #[serde(default = "default_rating_weight")]
    pub rating: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            specialization: default_specialization_weight(),
            approach: default_approach_weight(),
            availability: default_availability_weight(),
            preference: default_preference_weight(),
            budget: default_budget_weight(),
            rating: default_rating_weight(),
        }
    }
}

impl From<&WeightsConfig> for MatchWeights {
    fn from(config: &WeightsConfig) -> Self {
        MatchWeights {
            specialization: config.specialization,
            approach: config.approach,
            availability: config.availability,
            preference: config.preference,
            budget: config.budget,
            rating: config.rating,
        }
    }
}

fn default_specialization_weight() -> f64 { 0.25 }
fn default_approach_weight() -> f64 { 0.20 }
fn default_availability_weight() -> f64 { 0.15 }
fn default_preference_weight() -> f64 { 0.15 }
fn default_budget_weight() -> f64 { 0.10 }
fn default_rating_weight() -> f64 { 0.10 }

#[derive(Debug, Clone, Deserialize)]
pub struct UrgencyConfig {
    #[serde(default = "default_low_multiplier")]
    pub low: f64,
    #[serde(default = "default_medium_multiplier")]
    pub medium: f64,
    #[serde(default = "default_high_multiplier")]
    pub high: f64,
    #[serde(default = "default_crisis_multiplier")]
    pub crisis: f64,
}

impl Default for UrgencyConfig {
    fn default() -> Self {
        Self {
            low: default_low_multiplier(),
            medium: default_medium_multiplier(),
            high: default_high_multiplier(),
            crisis: default_crisis_multiplier(),
        }
    }
}

impl From<&UrgencyConfig> for UrgencyMultipliers {
    fn from(config: &UrgencyConfig) -> Self {
        UrgencyMultipliers {
            low: config.low,
            medium: config.medium,
            high: config.high,
            crisis: config.crisis,
        }
    }
}

fn default_low_multiplier() -> f64 { 1.0 }
fn default_medium_multiplier() -> f64 { 1.05 }
fn default_high_multiplier() -> f64 { 1.1 }
fn default_crisis_multiplier() -> f64 { 1.2 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with MINDBRIDGE)
    /// 5. DATABASE_URL, if set
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., MINDBRIDGE__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        with_database_url(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        with_database_url(settings)?.try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("MINDBRIDGE")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Let the conventional DATABASE_URL variable win over file configuration
fn with_database_url(settings: Config) -> Result<Config, ConfigError> {
    match std::env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => Config::builder()
            .add_source(settings)
            .set_override("database.url", url)?
            .build(),
        _ => Ok(settings),
    }
}
