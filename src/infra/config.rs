// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::infra::errors::{RecommenderError, Result};
use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub recommendation: RecommendationConfig,

    #[serde(default)]
    pub learning: LearningConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// Connection to the local embedding service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub url: String,
    pub timeout_secs: u64,
    pub normalize: bool,
    pub model: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8001".into(),
            timeout_secs: 30,
            normalize: true,
            model: "all-MiniLM-L6-v2".into(),
        }
    }
}

impl EmbeddingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// TTL tiers for cached results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub recommendation_ttl_secs: u64,
    pub explanation_ttl_secs: u64,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            recommendation_ttl_secs: 3600,
            explanation_ttl_secs: 1800,
            max_entries: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    pub default_limit: usize,
    pub max_limit: usize,
    /// The profile text plus candidates must fit one embedding request (100 texts).
    pub max_candidates: usize,
    pub feedback_boost: f32,
    pub feedback_penalty: f32,
    pub diversity_bonus: f32,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 50,
            max_candidates: 99,
            feedback_boost: 0.1,
            feedback_penalty: 0.1,
            diversity_bonus: 0.05,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningConfig {
    /// Ratings at or above this count as positive feedback.
    pub positive_rating_threshold: f64,
    pub high_rating: f64,
    pub low_rating: f64,
    pub score_adjustment: f32,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            positive_rating_threshold: 3.0,
            high_rating: 4.0,
            low_rating: 2.0,
            score_adjustment: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub db_path: Option<PathBuf>,
    pub log_level: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: "warn".into(),
        }
    }
}

impl StorageConfig {
    pub fn resolved_db_path(&self) -> PathBuf {
        self.db_path.clone().unwrap_or_else(paths::db_path)
    }
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> Result<Self> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| RecommenderError::Config(format!("{}: {e}", path.display())))
    }
}
