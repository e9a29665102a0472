// src/core/mod.rs — Recommendation generation

pub mod orchestrator;
pub mod reasoning;
pub mod scoring;
pub mod types;
pub mod validation;

pub use orchestrator::RecommendationOrchestrator;
