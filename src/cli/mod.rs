// src/cli/mod.rs — CLI definition (clap derive)

pub mod analytics;
pub mod feedback;
pub mod migrate;
pub mod recommend;
pub mod seed;
pub mod status;

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::cache::{InMemoryCacheBackend, RecommendationCache};
use crate::core::types::{Difficulty, RecommendationOptions};
use crate::core::RecommendationOrchestrator;
use crate::infra::config::Config;
use crate::memory::{self, SharedStore};
use crate::provider::http::HttpEmbeddingProvider;
use crate::provider::text::BasicTextProcessor;

#[derive(Parser)]
#[command(
    name = "project-recommender",
    about = "Content-based project recommendations with feedback learning",
    version
)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by `generate` and `refresh`.
#[derive(Args, Clone, Debug, Default)]
pub struct GenerateArgs {
    /// Maximum number of suggestions
    #[arg(short, long)]
    pub limit: Option<usize>,
    /// Drop candidates below this similarity (0.0-1.0)
    #[arg(long)]
    pub min_similarity: Option<f32>,
    /// Only consider these specializations (repeatable)
    #[arg(long = "include")]
    pub include: Vec<String>,
    /// Never consider these specializations (repeatable)
    #[arg(long = "exclude")]
    pub exclude: Vec<String>,
    /// Hardest difficulty to admit: beginner, intermediate, advanced, expert
    #[arg(long)]
    pub max_difficulty: Option<Difficulty>,
    /// Favour specializations not yet represented in the list
    #[arg(long)]
    pub diversity: bool,
}

impl GenerateArgs {
    pub fn to_options(&self, force_refresh: bool) -> RecommendationOptions {
        RecommendationOptions {
            limit: self.limit,
            min_similarity_score: self.min_similarity,
            include_specializations: self.include.clone(),
            exclude_specializations: self.exclude.clone(),
            max_difficulty: self.max_difficulty,
            include_diversity_boost: self.diversity,
            force_refresh,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate recommendations for a student (served from cache when fresh)
    Generate {
        student_id: String,
        #[command(flatten)]
        args: GenerateArgs,
        /// Bypass the cache
        #[arg(long)]
        force: bool,
    },
    /// Invalidate the cached result and regenerate
    Refresh {
        student_id: String,
        #[command(flatten)]
        args: GenerateArgs,
    },
    /// Submit explicit feedback on a suggestion
    Feedback {
        recommendation_id: String,
        project_id: String,
        /// LIKE, DISLIKE, BOOKMARK, VIEW or RATING
        #[arg(short = 't', long = "type")]
        feedback_type: String,
        /// Required for RATING (1-5)
        #[arg(short, long)]
        rating: Option<f64>,
        #[arg(short, long)]
        comment: Option<String>,
    },
    /// Record a behavioural signal (bookmark, view, dismiss, ...)
    Track {
        student_id: String,
        project_id: String,
        action: String,
        /// Arbitrary JSON attached to the event
        #[arg(long)]
        metadata: Option<String>,
    },
    /// Explain one suggestion of a stored recommendation
    Explain {
        recommendation_id: String,
        project_id: String,
    },
    /// Feedback summary for a project
    Aggregate { project_id: String },
    /// Preferences learned from a student's feedback
    Patterns { student_id: String },
    /// Ranking adjustment the next generation will apply
    Adjustments { student_id: String },
    /// A student's recommendations, newest first
    History {
        student_id: String,
        #[arg(short, long, default_value = "10")]
        limit: u32,
        /// Only the current active recommendation
        #[arg(long)]
        active: bool,
    },
    /// Recommendation quality report
    Analytics {
        /// Only data created at or after this RFC 3339 timestamp
        #[arg(long)]
        since: Option<String>,
        /// Show the rating distribution instead
        #[arg(long)]
        satisfaction: bool,
    },
    /// Load students and projects from a JSON file
    Seed { file: String },
    /// Check the embedding service and database
    Health,
    /// Show migration status or roll back the latest migration
    Migrate {
        #[arg(long)]
        status: bool,
        #[arg(long)]
        rollback: bool,
    },
}

/// Handles shared by the subcommands.
pub struct AppContext {
    pub config: Config,
    pub store: SharedStore,
    pub embeddings: Arc<HttpEmbeddingProvider>,
    pub orchestrator: RecommendationOrchestrator,
}

impl AppContext {
    /// Open the database and wire the engine against the configured services.
    pub fn open(config: Config) -> anyhow::Result<Self> {
        let store = memory::shared(memory::open(&config.storage.resolved_db_path())?);
        let embeddings = Arc::new(HttpEmbeddingProvider::from_config(&config.embedding));
        let cache = Arc::new(RecommendationCache::new(
            Arc::new(InMemoryCacheBackend::new(config.cache.max_entries)),
            config.cache.clone(),
        ));
        let orchestrator = RecommendationOrchestrator::new(
            store.clone(),
            embeddings.clone(),
            Arc::new(BasicTextProcessor),
            cache,
            &config,
        );
        Ok(Self {
            config,
            store,
            embeddings,
            orchestrator,
        })
    }
}

/// Pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
