// src/learner/types.rs — Learner type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::core::types::{Difficulty, FeedbackType, RecommendationFeedback};

/// Per-student score correction derived from feedback history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackAdjustment {
    pub boost_specializations: BTreeSet<String>,
    pub penalize_specializations: BTreeSet<String>,
    pub preferred_difficulty: Difficulty,
    pub score_adjustment: f32,
}

impl Default for FeedbackAdjustment {
    fn default() -> Self {
        Self {
            boost_specializations: BTreeSet::new(),
            penalize_specializations: BTreeSet::new(),
            preferred_difficulty: Difficulty::Intermediate,
            score_adjustment: 0.0,
        }
    }
}

impl FeedbackAdjustment {
    pub fn is_neutral(&self) -> bool {
        self.boost_specializations.is_empty()
            && self.penalize_specializations.is_empty()
            && self.score_adjustment == 0.0
    }

    pub fn boosts(&self, specialization: &str) -> bool {
        self.boost_specializations
            .iter()
            .any(|s| s.eq_ignore_ascii_case(specialization))
    }

    pub fn penalizes(&self, specialization: &str) -> bool {
        self.penalize_specializations
            .iter()
            .any(|s| s.eq_ignore_ascii_case(specialization))
    }
}

/// A behavioural signal from the student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImplicitAction {
    Bookmark,
    View,
    Dismiss,
    Other(String),
}

impl ImplicitAction {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "bookmark" => ImplicitAction::Bookmark,
            "view" => ImplicitAction::View,
            "dismiss" => ImplicitAction::Dismiss,
            other => ImplicitAction::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ImplicitAction::Bookmark => "bookmark",
            ImplicitAction::View => "view",
            ImplicitAction::Dismiss => "dismiss",
            ImplicitAction::Other(s) => s,
        }
    }

    /// Feedback type and inferred rating recorded for this action.
    pub fn feedback_mapping(&self) -> (FeedbackType, Option<f64>) {
        match self {
            ImplicitAction::Bookmark => (FeedbackType::Bookmark, Some(5.0)),
            ImplicitAction::View => (FeedbackType::View, Some(3.0)),
            ImplicitAction::Dismiss => (FeedbackType::Dislike, Some(1.0)),
            ImplicitAction::Other(_) => (FeedbackType::View, None),
        }
    }

    /// Implicit signal forwarded for an explicit feedback submission.
    pub fn for_feedback_type(feedback_type: FeedbackType) -> Self {
        match feedback_type {
            FeedbackType::Like | FeedbackType::Bookmark | FeedbackType::Rating => {
                ImplicitAction::Bookmark
            }
            FeedbackType::Dislike => ImplicitAction::Dismiss,
            FeedbackType::View => ImplicitAction::View,
        }
    }
}

impl fmt::Display for ImplicitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImplicitFeedback {
    pub student_id: String,
    pub project_id: String,
    pub action: ImplicitAction,
    pub timestamp: DateTime<Utc>,
    pub metadata: Option<serde_json::Value>,
    /// Set when the signal echoes an explicit feedback row.
    pub source_feedback_id: Option<String>,
}

impl ImplicitFeedback {
    pub fn now(student_id: &str, project_id: &str, action: ImplicitAction) -> Self {
        Self {
            student_id: student_id.to_string(),
            project_id: project_id.to_string(),
            action,
            timestamp: Utc::now(),
            metadata: None,
            source_feedback_id: None,
        }
    }

    pub fn forwarded_from(mut self, feedback_id: &str) -> Self {
        self.source_feedback_id = Some(feedback_id.to_string());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// LIKE/BOOKMARK and good ratings are positive; DISLIKE and poor ratings negative.
    pub fn classify(feedback: &RecommendationFeedback, positive_rating_threshold: f64) -> Self {
        match feedback.feedback_type {
            FeedbackType::Like | FeedbackType::Bookmark => Sentiment::Positive,
            FeedbackType::Dislike => Sentiment::Negative,
            FeedbackType::Rating => match feedback.rating {
                Some(r) if r >= positive_rating_threshold => Sentiment::Positive,
                Some(_) => Sentiment::Negative,
                None => Sentiment::Neutral,
            },
            FeedbackType::View => Sentiment::Neutral,
        }
    }
}

/// Per-project feedback summary. The shape is identical with or without data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackAggregation {
    pub project_id: String,
    pub total_feedback: u32,
    pub positive_count: u32,
    pub negative_count: u32,
    pub average_rating: f64,
    pub bookmark_count: u32,
    pub view_count: u32,
    pub dismissal_count: u32,
    pub feedback_by_type: BTreeMap<FeedbackType, u32>,
}

impl FeedbackAggregation {
    pub fn empty(project_id: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            total_feedback: 0,
            positive_count: 0,
            negative_count: 0,
            average_rating: 0.0,
            bookmark_count: 0,
            view_count: 0,
            dismissal_count: 0,
            feedback_by_type: FeedbackType::ALL.iter().map(|t| (*t, 0)).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentFeedbackPatterns {
    pub preferred_specializations: Vec<String>,
    pub disliked_specializations: Vec<String>,
    pub skill_preferences: Vec<String>,
    pub difficulty_preference: Difficulty,
    pub average_rating: f64,
    pub feedback_count: u32,
}

impl Default for StudentFeedbackPatterns {
    fn default() -> Self {
        Self {
            preferred_specializations: Vec::new(),
            disliked_specializations: Vec::new(),
            skill_preferences: Vec::new(),
            difficulty_preference: Difficulty::Intermediate,
            average_rating: 0.0,
            feedback_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_adjustment_is_neutral() {
        let adj = FeedbackAdjustment::default();
        assert!(adj.is_neutral());
        assert_eq!(adj.preferred_difficulty, Difficulty::Intermediate);
        let json = serde_json::to_value(&adj).unwrap();
        assert_eq!(json["preferred_difficulty"], "intermediate");
    }

    #[test]
    fn test_action_mapping() {
        assert_eq!(
            ImplicitAction::parse("bookmark").feedback_mapping(),
            (FeedbackType::Bookmark, Some(5.0))
        );
        assert_eq!(
            ImplicitAction::parse("VIEW").feedback_mapping(),
            (FeedbackType::View, Some(3.0))
        );
        assert_eq!(
            ImplicitAction::parse("dismiss").feedback_mapping(),
            (FeedbackType::Dislike, Some(1.0))
        );
        assert_eq!(
            ImplicitAction::parse("share").feedback_mapping(),
            (FeedbackType::View, None)
        );
    }

    #[test]
    fn test_feedback_type_to_action() {
        assert_eq!(
            ImplicitAction::for_feedback_type(FeedbackType::Like),
            ImplicitAction::Bookmark
        );
        assert_eq!(
            ImplicitAction::for_feedback_type(FeedbackType::Rating),
            ImplicitAction::Bookmark
        );
        assert_eq!(
            ImplicitAction::for_feedback_type(FeedbackType::Dislike),
            ImplicitAction::Dismiss
        );
        assert_eq!(
            ImplicitAction::for_feedback_type(FeedbackType::View),
            ImplicitAction::View
        );
    }

    #[test]
    fn test_empty_aggregation_lists_every_type() {
        let agg = FeedbackAggregation::empty("p1");
        assert_eq!(agg.feedback_by_type.len(), FeedbackType::ALL.len());
        assert!(agg.feedback_by_type.values().all(|c| *c == 0));
        let json = serde_json::to_value(&agg).unwrap();
        assert_eq!(json["feedback_by_type"]["RATING"], 0);
    }
}
