// src/analytics/mod.rs — Offline quality reporting

pub mod quality;

pub use quality::{ImprovementArea, QualityMetrics, RecommendationAnalytics, SatisfactionSummary};
