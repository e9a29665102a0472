// src/core/scoring.rs — Post-similarity score adjustments
//
// Candidates arrive in similarity rank order. Every pass keeps scores in
// [0, 1] and leaves the list sorted by descending final score, ties in
// their incoming order.

use std::collections::HashSet;

use super::types::Project;
use crate::infra::config::RecommendationConfig;
use crate::learner::types::FeedbackAdjustment;

/// A ranked candidate carrying its score components.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub project: Project,
    pub similarity: f32,
    pub feedback_adjustment: f32,
    pub diversity_bonus: f32,
    pub final_score: f32,
    pub diversity_boost: bool,
}

impl ScoredCandidate {
    pub fn new(project: Project, similarity: f32) -> Self {
        Self {
            project,
            similarity,
            feedback_adjustment: 0.0,
            diversity_bonus: 0.0,
            final_score: similarity,
            diversity_boost: false,
        }
    }
}

fn sort_by_final_score(candidates: &mut [ScoredCandidate]) {
    candidates.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
}

/// Add the student's global adjustment to every candidate, plus the fixed
/// boost or penalty for liked and disliked specializations.
pub fn apply_feedback_adjustment(
    candidates: &mut [ScoredCandidate],
    adjustment: &FeedbackAdjustment,
    config: &RecommendationConfig,
) {
    if adjustment.is_neutral() {
        return;
    }
    for c in candidates.iter_mut() {
        let mut delta = adjustment.score_adjustment;
        if adjustment.boosts(&c.project.specialization) {
            delta += config.feedback_boost;
        }
        if adjustment.penalizes(&c.project.specialization) {
            delta -= config.feedback_penalty;
        }
        c.feedback_adjustment = delta;
        c.final_score = (c.similarity + delta).clamp(0.0, 1.0);
    }
    sort_by_final_score(candidates);
}

/// Reward specializations not yet seen higher up the list. The first
/// candidate only seeds the seen set. Returns how many candidates got the bonus.
pub fn apply_diversity_boost(candidates: &mut [ScoredCandidate], bonus: f32) -> usize {
    let mut seen: HashSet<String> = HashSet::new();
    let mut boosted = 0;

    for (i, c) in candidates.iter_mut().enumerate() {
        let key = c.project.specialization.to_lowercase();
        let first_of_kind = seen.insert(key);
        if i > 0 && first_of_kind {
            c.diversity_bonus = bonus;
            c.diversity_boost = true;
            c.final_score = (c.final_score + bonus).clamp(0.0, 1.0);
            boosted += 1;
        }
    }

    if boosted > 0 {
        sort_by_final_score(candidates);
    }
    boosted
}

/// Mean pre-adjustment similarity, 0 for an empty slice.
pub fn average_similarity(candidates: &[ScoredCandidate]) -> f32 {
    if candidates.is_empty() {
        return 0.0;
    }
    candidates.iter().map(|c| c.similarity).sum::<f32>() / candidates.len() as f32
}
