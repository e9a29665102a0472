// src/core/types.rs — Domain types for recommendation generation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─── Catalog ────────────────────────────────────────────────────────────────

/// Project difficulty, totally ordered from easiest to hardest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
        Difficulty::Expert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
            Difficulty::Expert => "expert",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| format!("unknown difficulty '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApprovalStatus::Pending),
            "approved" => Ok(ApprovalStatus::Approved),
            "rejected" => Ok(ApprovalStatus::Rejected),
            other => Err(format!("unknown approval status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub preferred_specializations: Vec<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub career_goals: Option<String>,
}

impl StudentProfile {
    /// Required fields that are empty, in a stable order.
    pub fn missing_required_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.skills.is_empty() {
            missing.push("skills".to_string());
        }
        if self.interests.is_empty() {
            missing.push("interests".to_string());
        }
        if self.preferred_specializations.is_empty() {
            missing.push("preferredSpecializations".to_string());
        }
        missing
    }

    /// Percentage (0-100) of profile sections that carry content.
    pub fn completeness(&self) -> f32 {
        let filled = [
            !self.skills.is_empty(),
            !self.interests.is_empty(),
            !self.preferred_specializations.is_empty(),
            self.bio.as_deref().is_some_and(|b| !b.trim().is_empty()),
            self.career_goals
                .as_deref()
                .is_some_and(|g| !g.trim().is_empty()),
        ];
        let count = filled.iter().filter(|f| **f).count();
        count as f32 / filled.len() as f32 * 100.0
    }

    pub fn snapshot(&self) -> ProfileSnapshot {
        ProfileSnapshot {
            specializations: self.preferred_specializations.clone(),
            skills: self.skills.clone(),
            interests: self.interests.clone(),
            completeness: self.completeness(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub profile: Option<StudentProfile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    pub specialization: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub technology_stack: Vec<String>,
    pub approval_status: ApprovalStatus,
}

// ─── Recommendations ────────────────────────────────────────────────────────

/// Immutable copy of the profile taken at generation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub specializations: Vec<String>,
    pub skills: Vec<String>,
    pub interests: Vec<String>,
    pub completeness: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSuggestion {
    pub project_id: String,
    pub title: String,
    pub specialization: String,
    pub difficulty: Difficulty,
    pub final_score: f32,
    pub similarity_score: f32,
    /// Net delta contributed by feedback learning (before clamping).
    #[serde(default)]
    pub feedback_adjustment: f32,
    #[serde(default)]
    pub diversity_bonus: f32,
    pub matching_skills: Vec<String>,
    pub matching_interests: Vec<String>,
    pub reasoning: String,
    pub diversity_boost: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationStatus {
    Active,
    Superseded,
}

impl RecommendationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationStatus::Active => "active",
            RecommendationStatus::Superseded => "superseded",
        }
    }
}

impl FromStr for RecommendationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(RecommendationStatus::Active),
            "superseded" => Ok(RecommendationStatus::Superseded),
            other => Err(format!("unknown recommendation status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    pub student_id: String,
    pub profile_snapshot: ProfileSnapshot,
    pub project_suggestions: Vec<ProjectSuggestion>,
    pub status: RecommendationStatus,
    pub average_similarity_score: f32,
    pub created_at: DateTime<Utc>,
}

impl Recommendation {
    pub fn suggestion(&self, project_id: &str) -> Option<&ProjectSuggestion> {
        self.project_suggestions
            .iter()
            .find(|s| s.project_id == project_id)
    }
}

// ─── Feedback ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedbackType {
    Like,
    Dislike,
    Bookmark,
    View,
    Rating,
}

impl FeedbackType {
    pub const ALL: [FeedbackType; 5] = [
        FeedbackType::Like,
        FeedbackType::Dislike,
        FeedbackType::Bookmark,
        FeedbackType::View,
        FeedbackType::Rating,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackType::Like => "LIKE",
            FeedbackType::Dislike => "DISLIKE",
            FeedbackType::Bookmark => "BOOKMARK",
            FeedbackType::View => "VIEW",
            FeedbackType::Rating => "RATING",
        }
    }
}

impl fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeedbackType::ALL
            .iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| format!("unknown feedback type '{s}'"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationFeedback {
    pub id: String,
    pub recommendation_id: String,
    pub project_id: String,
    pub feedback_type: FeedbackType,
    /// Explicit rating; present iff `feedback_type == Rating`.
    pub rating: Option<f64>,
    /// Rating inferred from an implicit action.
    pub implicit_rating: Option<f64>,
    pub comment: Option<String>,
    pub is_implicit: bool,
    pub created_at: DateTime<Utc>,
    /// Explicit submission this implicit row echoes.
    #[serde(default)]
    pub source_feedback_id: Option<String>,
}

impl RecommendationFeedback {
    pub fn effective_rating(&self) -> Option<f64> {
        self.rating.or(self.implicit_rating)
    }

    /// An implicit echo of explicit feedback. Learning counts the explicit row only.
    pub fn is_forwarded(&self) -> bool {
        self.source_feedback_id.is_some()
    }
}

/// Explicit feedback submitted by a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackInput {
    pub feedback_type: FeedbackType,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl FeedbackInput {
    pub fn new(feedback_type: FeedbackType) -> Self {
        Self {
            feedback_type,
            rating: None,
            comment: None,
        }
    }

    pub fn rating(value: f64) -> Self {
        Self {
            feedback_type: FeedbackType::Rating,
            rating: Some(value),
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

// ─── Requests and results ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationOptions {
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub min_similarity_score: Option<f32>,
    #[serde(default)]
    pub include_specializations: Vec<String>,
    #[serde(default)]
    pub exclude_specializations: Vec<String>,
    #[serde(default)]
    pub max_difficulty: Option<Difficulty>,
    #[serde(default)]
    pub include_diversity_boost: bool,
    #[serde(default)]
    pub force_refresh: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationMetadata {
    pub recommendation_id: String,
    pub total_candidates: usize,
    /// Approved candidates cut by `max_candidates` before embedding.
    #[serde(default)]
    pub dropped_candidates: usize,
    pub ranked_candidates: usize,
    #[serde(default)]
    pub embedding_provider: String,
    pub embedding_tokens: u32,
    pub embedding_ms: u64,
    pub processing_ms: u64,
    pub score_adjustment: f32,
    pub adjustment_degraded: bool,
    pub diversity_applied: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub recommendations: Vec<ProjectSuggestion>,
    pub reasoning: String,
    pub average_similarity_score: f32,
    pub from_cache: bool,
    pub generated_at: DateTime<Utc>,
    pub metadata: RecommendationMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub similarity_score: f32,
    pub feedback_adjustment: f32,
    pub diversity_bonus: f32,
    pub final_score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingElements {
    pub skills: Vec<String>,
    pub interests: Vec<String>,
    pub specialization_match: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub recommendation_id: String,
    pub project_id: String,
    pub project_title: String,
    pub reasoning: String,
    pub score_breakdown: ScoreBreakdown,
    pub matching_elements: MatchingElements,
    pub improvement_suggestions: Vec<String>,
}

/// A value that may have been replaced by a fallback after a soft failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Value(T),
    Degraded { fallback: T, reason: String },
}

impl<T> Outcome<T> {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded { .. })
    }

    pub fn value(&self) -> &T {
        match self {
            Outcome::Value(v) => v,
            Outcome::Degraded { fallback, .. } => fallback,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Outcome::Value(v) => v,
            Outcome::Degraded { fallback, .. } => fallback,
        }
    }
}
