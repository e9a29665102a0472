// src/learner/feedback.rs — Feedback-driven learning
//
// Reads feedback history and turns it into per-student ranking adjustments.
// Never mutates recommendations; the only write is recording implicit feedback.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info, warn};

use super::types::*;
use crate::core::types::{Difficulty, FeedbackType, Outcome, RecommendationFeedback};
use crate::infra::config::LearningConfig;
use crate::infra::errors::Result;
use crate::memory::{self, SharedStore};

const MAX_SKILL_PREFERENCES: usize = 10;

pub struct FeedbackLearningEngine {
    store: SharedStore,
    config: LearningConfig,
}

impl FeedbackLearningEngine {
    pub fn new(store: SharedStore, config: LearningConfig) -> Self {
        Self { store, config }
    }

    /// Record a behavioural signal against the most recent recommendation that
    /// suggested the project. Returns the feedback id, or `None` when no
    /// recommendation can be attributed (the signal is dropped).
    pub fn track_implicit_feedback(&self, event: &ImplicitFeedback) -> Result<Option<String>> {
        let store = memory::lock(&self.store)?;
        let Some(rec) =
            store.find_latest_recommendation_with_project(&event.student_id, &event.project_id)?
        else {
            debug!(
                "No recommendation for student {} contains project {}; dropping '{}' signal",
                event.student_id, event.project_id, event.action
            );
            return Ok(None);
        };

        let (feedback_type, implicit_rating) = event.action.feedback_mapping();
        let feedback = RecommendationFeedback {
            id: uuid::Uuid::new_v4().to_string(),
            recommendation_id: rec.id.clone(),
            project_id: event.project_id.clone(),
            feedback_type,
            rating: None,
            implicit_rating,
            comment: Some(format!("Implicit feedback from {}", event.action)),
            is_implicit: true,
            created_at: event.timestamp,
            source_feedback_id: event.source_feedback_id.clone(),
        };
        store.insert_feedback(&feedback)?;

        if let Some(meta) = &event.metadata {
            debug!("Implicit feedback {} metadata: {meta}", feedback.id);
        }
        info!(
            "Tracked implicit '{}' for project {} (recommendation {})",
            event.action, event.project_id, rec.id
        );
        Ok(Some(feedback.id))
    }

    /// Summarize the feedback rows for a project, plus bookmark and view counts.
    /// Forwarded echoes are skipped so each submission counts once.
    pub fn aggregate_project_feedback(&self, project_id: &str) -> Result<FeedbackAggregation> {
        let store = memory::lock(&self.store)?;
        let rows = store.query_feedback_for_project(project_id)?;
        let bookmarks = store.count_bookmarks(project_id)?;
        let views = store.count_views(project_id)?;
        drop(store);

        let mut agg = FeedbackAggregation::empty(project_id);
        agg.bookmark_count = bookmarks as u32;
        agg.view_count = views as u32;

        let mut rating_sum = 0.0;
        let mut rating_count = 0u32;

        for row in rows.iter().filter(|r| !r.is_forwarded()) {
            agg.total_feedback += 1;
            *agg.feedback_by_type.entry(row.feedback_type).or_insert(0) += 1;

            match Sentiment::classify(row, self.config.positive_rating_threshold) {
                Sentiment::Positive => agg.positive_count += 1,
                Sentiment::Negative => agg.negative_count += 1,
                Sentiment::Neutral => {}
            }

            if row.feedback_type == FeedbackType::Dislike {
                agg.dismissal_count += 1;
            }
            if let (FeedbackType::Rating, Some(r)) = (row.feedback_type, row.rating) {
                rating_sum += r;
                rating_count += 1;
            }
        }

        if rating_count > 0 {
            agg.average_rating = rating_sum / rating_count as f64;
        }
        Ok(agg)
    }

    /// Derive a student's preferences from their feedback history.
    pub fn analyze_student_feedback_patterns(
        &self,
        student_id: &str,
    ) -> Result<StudentFeedbackPatterns> {
        let mut rows = memory::lock(&self.store)?.query_student_feedback(student_id)?;
        // The explicit row already carries the student's judgement.
        rows.retain(|r| !r.feedback.is_forwarded());
        if rows.is_empty() {
            return Ok(StudentFeedbackPatterns::default());
        }

        // Net signal per specialization: positive minus negative.
        let mut net: BTreeMap<String, i32> = BTreeMap::new();
        let mut skills: HashMap<String, (u32, String)> = HashMap::new();
        let mut difficulties: BTreeMap<Difficulty, u32> = BTreeMap::new();
        let mut rating_sum = 0.0;
        let mut rating_count = 0u32;

        for row in &rows {
            if let Some(r) = row.feedback.effective_rating() {
                rating_sum += r;
                rating_count += 1;
            }

            match Sentiment::classify(&row.feedback, self.config.positive_rating_threshold) {
                Sentiment::Positive => {
                    *net.entry(row.specialization.clone()).or_insert(0) += 1;
                    *difficulties.entry(row.difficulty).or_insert(0) += 1;
                    for skill in row.technology_stack.iter().chain(row.tags.iter()) {
                        let entry = skills
                            .entry(skill.to_lowercase())
                            .or_insert_with(|| (0, skill.clone()));
                        entry.0 += 1;
                    }
                }
                Sentiment::Negative => {
                    *net.entry(row.specialization.clone()).or_insert(0) -= 1;
                }
                Sentiment::Neutral => {}
            }
        }

        let preferred_specializations = net
            .iter()
            .filter(|(_, n)| **n > 0)
            .map(|(s, _)| s.clone())
            .collect();
        let disliked_specializations = net
            .iter()
            .filter(|(_, n)| **n < 0)
            .map(|(s, _)| s.clone())
            .collect();

        let mut skill_counts: Vec<(u32, String)> = skills.into_values().collect();
        skill_counts.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        let skill_preferences = skill_counts
            .into_iter()
            .take(MAX_SKILL_PREFERENCES)
            .map(|(_, s)| s)
            .collect();

        // Most common difficulty among liked projects; ties go to the easier one.
        let difficulty_preference = difficulties
            .iter()
            .fold(None::<(Difficulty, u32)>, |best, (d, c)| match best {
                Some((_, bc)) if bc >= *c => best,
                _ => Some((*d, *c)),
            })
            .map(|(d, _)| d)
            .unwrap_or(Difficulty::Intermediate);

        Ok(StudentFeedbackPatterns {
            preferred_specializations,
            disliked_specializations,
            skill_preferences,
            difficulty_preference,
            average_rating: if rating_count > 0 {
                rating_sum / rating_count as f64
            } else {
                0.0
            },
            feedback_count: rows.len() as u32,
        })
    }

    /// Pure mapping from patterns to an adjustment.
    pub fn adjustment_from_patterns(&self, patterns: &StudentFeedbackPatterns) -> FeedbackAdjustment {
        // average_rating is 0 only when nothing was rated; that is not a low rating.
        let score_adjustment = if patterns.feedback_count == 0 || patterns.average_rating <= 0.0 {
            0.0
        } else if patterns.average_rating >= self.config.high_rating {
            self.config.score_adjustment
        } else if patterns.average_rating < self.config.low_rating {
            -self.config.score_adjustment
        } else {
            0.0
        };

        FeedbackAdjustment {
            boost_specializations: patterns.preferred_specializations.iter().cloned().collect(),
            penalize_specializations: patterns.disliked_specializations.iter().cloned().collect(),
            preferred_difficulty: patterns.difficulty_preference,
            score_adjustment,
        }
    }

    /// Adjustment for the next ranking pass. Fails open: any analysis error
    /// yields the neutral adjustment, marked as degraded.
    pub fn get_recommendation_adjustments(&self, student_id: &str) -> Outcome<FeedbackAdjustment> {
        match self.analyze_student_feedback_patterns(student_id) {
            Ok(patterns) => Outcome::Value(self.adjustment_from_patterns(&patterns)),
            Err(e) => {
                warn!("Feedback analysis failed for student {student_id}, using neutral adjustment: {e}");
                Outcome::Degraded {
                    fallback: FeedbackAdjustment::default(),
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> FeedbackLearningEngine {
        let store = memory::in_memory().unwrap();
        FeedbackLearningEngine::new(memory::shared(store), LearningConfig::default())
    }

    fn patterns(avg: f64, count: u32) -> StudentFeedbackPatterns {
        StudentFeedbackPatterns {
            average_rating: avg,
            feedback_count: count,
            ..Default::default()
        }
    }

    #[test]
    fn test_adjustment_thresholds() {
        let e = engine();
        assert!((e.adjustment_from_patterns(&patterns(4.5, 3)).score_adjustment - 0.1).abs() < 1e-6);
        assert!((e.adjustment_from_patterns(&patterns(4.0, 1)).score_adjustment - 0.1).abs() < 1e-6);
        assert!((e.adjustment_from_patterns(&patterns(1.5, 2)).score_adjustment + 0.1).abs() < 1e-6);
        assert_eq!(e.adjustment_from_patterns(&patterns(2.0, 2)).score_adjustment, 0.0);
        assert_eq!(e.adjustment_from_patterns(&patterns(3.0, 2)).score_adjustment, 0.0);
    }

    #[test]
    fn test_unrated_history_is_not_penalized() {
        let e = engine();
        assert_eq!(e.adjustment_from_patterns(&patterns(0.0, 4)).score_adjustment, 0.0);
        assert!(e.adjustment_from_patterns(&patterns(0.0, 0)).is_neutral());
    }

    #[test]
    fn test_no_history_defaults() {
        let e = engine();
        let p = e.analyze_student_feedback_patterns("nobody").unwrap();
        assert_eq!(p, StudentFeedbackPatterns::default());
        let adj = e.get_recommendation_adjustments("nobody");
        assert!(!adj.is_degraded());
        assert!(adj.value().is_neutral());
    }

    #[test]
    fn test_zero_feedback_aggregation_shape() {
        let e = engine();
        let agg = e.aggregate_project_feedback("ghost").unwrap();
        assert_eq!(agg, FeedbackAggregation::empty("ghost"));
    }
}
