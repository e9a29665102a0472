// src/analytics/quality.rs — Recommendation quality metrics
//
// Read-only batch queries over persisted recommendations and feedback.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::{FeedbackType, Recommendation, RecommendationFeedback};
use crate::infra::config::LearningConfig;
use crate::infra::errors::Result;
use crate::learner::types::Sentiment;
use crate::memory::{self, SharedStore};

// Positive weights sum to 1 so a flawless history scores 1.0.
const WEIGHT_SIMILARITY: f64 = 0.35;
const WEIGHT_FEEDBACK_RATE: f64 = 0.15;
const WEIGHT_POSITIVE_RATE: f64 = 0.3;
const WEIGHT_RATING: f64 = 0.2;
const WEIGHT_DISMISSAL: f64 = 0.1;

const TARGET_SIMILARITY: f64 = 0.6;
const TARGET_FEEDBACK_RATE: f64 = 0.2;
const TARGET_POSITIVE_RATE: f64 = 0.5;
const TARGET_RATING: f64 = 3.0;
const MAX_DISMISSAL_RATE: f64 = 0.3;

const SATISFIED_RATING: f64 = 4.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovementArea {
    pub metric: String,
    pub current: f64,
    pub target: f64,
    /// Distance from the target; larger is worse.
    pub gap: f64,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub since: Option<DateTime<Utc>>,
    pub total_recommendations: usize,
    pub total_suggestions: usize,
    pub total_feedback: usize,
    pub average_similarity: f64,
    /// Share of suggestions that received explicit feedback.
    pub feedback_rate: f64,
    pub positive_engagement_rate: f64,
    pub average_rating: f64,
    pub dismissal_rate: f64,
    pub quality_score: f64,
    pub improvement_areas: Vec<ImprovementArea>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatisfactionSummary {
    /// Explicit ratings bucketed by whole star, 1 through 5.
    pub rating_distribution: BTreeMap<u8, u32>,
    pub satisfied_share: f64,
    pub total_rated: u32,
    pub average_rating: f64,
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Weighted blend in [0, 1].
pub fn quality_score(
    average_similarity: f64,
    feedback_rate: f64,
    positive_engagement_rate: f64,
    average_rating: f64,
    dismissal_rate: f64,
) -> f64 {
    let score = WEIGHT_SIMILARITY * average_similarity
        + WEIGHT_FEEDBACK_RATE * feedback_rate
        + WEIGHT_POSITIVE_RATE * positive_engagement_rate
        + WEIGHT_RATING * (average_rating / 5.0)
        - WEIGHT_DISMISSAL * dismissal_rate;
    score.clamp(0.0, 1.0)
}

fn improvement_areas(metrics: &QualityMetrics, has_ratings: bool) -> Vec<ImprovementArea> {
    let mut areas = Vec::new();
    let mut below = |metric: &str, current: f64, target: f64, advice: &str| {
        if current < target {
            areas.push(ImprovementArea {
                metric: metric.to_string(),
                current,
                target,
                gap: target - current,
                recommendation: advice.to_string(),
            });
        }
    };

    below(
        "average_similarity",
        metrics.average_similarity,
        TARGET_SIMILARITY,
        "Improve semantic matching: enrich project abstracts and student profiles.",
    );
    below(
        "feedback_rate",
        metrics.feedback_rate,
        TARGET_FEEDBACK_RATE,
        "Encourage students to rate or react to their recommendations.",
    );
    below(
        "positive_engagement_rate",
        metrics.positive_engagement_rate,
        TARGET_POSITIVE_RATE,
        "Review ranking adjustments; fewer than half of reactions are positive.",
    );
    if has_ratings {
        below(
            "average_rating",
            metrics.average_rating,
            TARGET_RATING,
            "Investigate low-rated suggestions and their specializations.",
        );
    }

    if metrics.dismissal_rate > MAX_DISMISSAL_RATE {
        areas.push(ImprovementArea {
            metric: "dismissal_rate".into(),
            current: metrics.dismissal_rate,
            target: MAX_DISMISSAL_RATE,
            gap: metrics.dismissal_rate - MAX_DISMISSAL_RATE,
            recommendation: "Too many suggestions are dismissed; tighten filters or raise the similarity threshold.".into(),
        });
    }

    areas.sort_by(|a, b| b.gap.total_cmp(&a.gap));
    areas
}

pub struct RecommendationAnalytics {
    store: SharedStore,
    positive_rating_threshold: f64,
}

impl RecommendationAnalytics {
    pub fn new(store: SharedStore, learning: &LearningConfig) -> Self {
        Self {
            store,
            positive_rating_threshold: learning.positive_rating_threshold,
        }
    }

    fn load(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<(Vec<Recommendation>, Vec<RecommendationFeedback>)> {
        let store = memory::lock(&self.store)?;
        let recommendations = store.query_recommendations_since(since)?;
        let feedback = store
            .query_feedback_since(since)?
            .into_iter()
            .filter(|f| !f.is_implicit)
            .collect();
        Ok((recommendations, feedback))
    }

    /// Quality metrics over recommendations and explicit feedback created at or
    /// after `since` (all time when `None`).
    pub fn quality_metrics(&self, since: Option<DateTime<Utc>>) -> Result<QualityMetrics> {
        let (recommendations, feedback) = self.load(since)?;
        debug!(
            "Computing quality over {} recommendations and {} feedback rows",
            recommendations.len(),
            feedback.len()
        );

        let total_suggestions: usize = recommendations
            .iter()
            .map(|r| r.project_suggestions.len())
            .sum();
        let average_similarity = mean(
            recommendations
                .iter()
                .filter(|r| !r.project_suggestions.is_empty())
                .map(|r| r.average_similarity_score as f64),
        );

        let engaged: HashSet<(&str, &str)> = feedback
            .iter()
            .map(|f| (f.recommendation_id.as_str(), f.project_id.as_str()))
            .collect();
        let feedback_rate = ratio(engaged.len(), total_suggestions).min(1.0);

        let positive = feedback
            .iter()
            .filter(|f| {
                Sentiment::classify(f, self.positive_rating_threshold) == Sentiment::Positive
            })
            .count();
        let dismissed = feedback
            .iter()
            .filter(|f| f.feedback_type == FeedbackType::Dislike)
            .count();
        let ratings: Vec<f64> = feedback.iter().filter_map(|f| f.rating).collect();

        let positive_engagement_rate = ratio(positive, feedback.len());
        let dismissal_rate = ratio(dismissed, feedback.len());
        let average_rating = mean(ratings.iter().copied());

        let mut metrics = QualityMetrics {
            since,
            total_recommendations: recommendations.len(),
            total_suggestions,
            total_feedback: feedback.len(),
            average_similarity,
            feedback_rate,
            positive_engagement_rate,
            average_rating,
            dismissal_rate,
            quality_score: quality_score(
                average_similarity,
                feedback_rate,
                positive_engagement_rate,
                average_rating,
                dismissal_rate,
            ),
            improvement_areas: Vec::new(),
        };
        metrics.improvement_areas = improvement_areas(&metrics, !ratings.is_empty());
        Ok(metrics)
    }

    /// Distribution of explicit ratings across all time.
    pub fn satisfaction_summary(&self) -> Result<SatisfactionSummary> {
        let (_, feedback) = self.load(None)?;
        let ratings: Vec<f64> = feedback.iter().filter_map(|f| f.rating).collect();

        let mut rating_distribution: BTreeMap<u8, u32> = (1..=5).map(|star| (star, 0)).collect();
        for r in &ratings {
            let star = r.floor().clamp(1.0, 5.0) as u8;
            *rating_distribution.entry(star).or_insert(0) += 1;
        }
        let satisfied = ratings.iter().filter(|r| **r >= SATISFIED_RATING).count();

        Ok(SatisfactionSummary {
            rating_distribution,
            satisfied_share: ratio(satisfied, ratings.len()),
            total_rated: ratings.len() as u32,
            average_rating: mean(ratings.iter().copied()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_score_weights() {
        let perfect = quality_score(1.0, 1.0, 1.0, 5.0, 0.0);
        assert!((perfect - 1.0).abs() < 1e-9);
        assert_eq!(quality_score(0.0, 0.0, 0.0, 0.0, 1.0), 0.0);
        let mid = quality_score(0.75, 0.5, 0.5, 4.0, 0.25);
        let expected = 0.35 * 0.75 + 0.15 * 0.5 + 0.3 * 0.5 + 0.2 * 0.8 - 0.1 * 0.25;
        assert!((mid - expected).abs() < 1e-9);
    }

    #[test]
    fn test_ratio_and_mean_handle_empty() {
        assert_eq!(ratio(3, 0), 0.0);
        assert_eq!(mean(std::iter::empty()), 0.0);
        assert!((mean([1.0, 2.0].into_iter()) - 1.5).abs() < 1e-9);
    }

    fn metrics(similarity: f64, feedback_rate: f64, positive: f64, dismissal: f64) -> QualityMetrics {
        QualityMetrics {
            since: None,
            total_recommendations: 1,
            total_suggestions: 10,
            total_feedback: 1,
            average_similarity: similarity,
            feedback_rate,
            positive_engagement_rate: positive,
            average_rating: 0.0,
            dismissal_rate: dismissal,
            quality_score: 0.0,
            improvement_areas: vec![],
        }
    }

    #[test]
    fn test_improvement_areas_ranked_by_gap() {
        let areas = improvement_areas(&metrics(0.5, 0.0, 0.45, 0.6), false);
        let names: Vec<&str> = areas.iter().map(|a| a.metric.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "dismissal_rate",
                "feedback_rate",
                "average_similarity",
                "positive_engagement_rate"
            ]
        );
        assert!(areas[2].recommendation.starts_with("Improve semantic matching"));
    }

    #[test]
    fn test_no_improvements_when_healthy() {
        assert!(improvement_areas(&metrics(0.8, 0.5, 0.9, 0.1), false).is_empty());
    }

    #[test]
    fn test_rating_area_requires_ratings() {
        assert!(improvement_areas(&metrics(0.8, 0.5, 0.9, 0.1), false).is_empty());
        let areas = improvement_areas(&metrics(0.8, 0.5, 0.9, 0.1), true);
        assert_eq!(areas.len(), 1);
        assert_eq!(areas[0].metric, "average_rating");
    }
}
