// src/core/validation.rs — Request validation
//
// Each validator returns every failed rule at once so callers can report
// them together.

use super::types::{FeedbackInput, FeedbackType, RecommendationOptions, StudentProfile};
use crate::infra::config::RecommendationConfig;
use crate::infra::errors::{RecommenderError, Result, ValidationFailure};

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;
pub const MAX_COMMENT_CHARS: usize = 1000;

/// A profile must exist and carry skills, interests and preferred specializations.
pub fn validate_profile(profile: Option<&StudentProfile>) -> Result<&StudentProfile> {
    let Some(profile) = profile else {
        return Err(RecommenderError::InvalidProfile {
            missing_fields: StudentProfile::default().missing_required_fields(),
        });
    };
    let missing = profile.missing_required_fields();
    if missing.is_empty() {
        Ok(profile)
    } else {
        Err(RecommenderError::InvalidProfile {
            missing_fields: missing,
        })
    }
}

pub fn validate_options(
    options: &RecommendationOptions,
    config: &RecommendationConfig,
) -> Vec<ValidationFailure> {
    let mut failures = Vec::new();

    if let Some(limit) = options.limit {
        if limit == 0 || limit > config.max_limit {
            failures.push(ValidationFailure::new(
                "limit",
                "range",
                format!("limit must be between 1 and {}", config.max_limit),
            ));
        }
    }

    if let Some(min) = options.min_similarity_score {
        if !(0.0..=1.0).contains(&min) {
            failures.push(ValidationFailure::new(
                "minSimilarityScore",
                "range",
                "minSimilarityScore must be between 0 and 1",
            ));
        }
    }

    let overlap: Vec<&String> = options
        .include_specializations
        .iter()
        .filter(|s| {
            options
                .exclude_specializations
                .iter()
                .any(|e| e.eq_ignore_ascii_case(s))
        })
        .collect();
    if !overlap.is_empty() {
        failures.push(ValidationFailure::new(
            "excludeSpecializations",
            "disjoint",
            format!(
                "specializations cannot be both included and excluded: {}",
                overlap
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        ));
    }

    failures
}

pub fn validate_feedback(input: &FeedbackInput) -> Vec<ValidationFailure> {
    let mut failures = Vec::new();

    match (input.feedback_type, input.rating) {
        (FeedbackType::Rating, None) => failures.push(ValidationFailure::new(
            "rating",
            "required",
            "rating is required for RATING feedback",
        )),
        (FeedbackType::Rating, Some(r)) if !(MIN_RATING..=MAX_RATING).contains(&r) => {
            failures.push(ValidationFailure::new(
                "rating",
                "range",
                format!("rating must be between {MIN_RATING} and {MAX_RATING}"),
            ))
        }
        (FeedbackType::Rating, Some(_)) => {}
        (other, Some(_)) => failures.push(ValidationFailure::new(
            "rating",
            "forbidden",
            format!("rating is only accepted for RATING feedback, not {other}"),
        )),
        (_, None) => {}
    }

    if let Some(comment) = &input.comment {
        if comment.chars().count() > MAX_COMMENT_CHARS {
            failures.push(ValidationFailure::new(
                "comment",
                "max_length",
                format!("comment must be at most {MAX_COMMENT_CHARS} characters"),
            ));
        }
    }

    failures
}

/// Turn collected failures into an `InvalidInput` error.
pub fn ensure_valid(failures: Vec<ValidationFailure>) -> Result<()> {
    if failures.is_empty() {
        Ok(())
    } else {
        Err(RecommenderError::InvalidInput { failures })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_profile_names_all_fields() {
        match validate_profile(None) {
            Err(RecommenderError::InvalidProfile { missing_fields }) => {
                assert_eq!(
                    missing_fields,
                    vec!["skills", "interests", "preferredSpecializations"]
                );
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_partial_profile() {
        let profile = StudentProfile {
            skills: vec!["Go".into()],
            ..Default::default()
        };
        match validate_profile(Some(&profile)) {
            Err(RecommenderError::InvalidProfile { missing_fields }) => {
                assert_eq!(missing_fields, vec!["interests", "preferredSpecializations"]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_options_ranges() {
        let config = RecommendationConfig::default();
        let options = RecommendationOptions {
            limit: Some(0),
            min_similarity_score: Some(1.5),
            ..Default::default()
        };
        let failures = validate_options(&options, &config);
        let fields: Vec<&str> = failures.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["limit", "minSimilarityScore"]);

        let ok = RecommendationOptions {
            limit: Some(50),
            min_similarity_score: Some(0.0),
            ..Default::default()
        };
        assert!(validate_options(&ok, &config).is_empty());
    }

    #[test]
    fn test_include_exclude_overlap() {
        let options = RecommendationOptions {
            include_specializations: vec!["AI/ML".into()],
            exclude_specializations: vec!["ai/ml".into()],
            ..Default::default()
        };
        let failures = validate_options(&options, &RecommendationConfig::default());
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].rule, "disjoint");
    }

    #[test]
    fn test_rating_required() {
        let failures = validate_feedback(&FeedbackInput::new(FeedbackType::Rating));
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].field, "rating");
        assert_eq!(failures[0].rule, "required");
        assert!(ensure_valid(failures).is_err());
    }

    #[test]
    fn test_rating_bounds() {
        assert!(validate_feedback(&FeedbackInput::rating(4.5)).is_empty());
        assert!(validate_feedback(&FeedbackInput::rating(1.0)).is_empty());
        assert!(validate_feedback(&FeedbackInput::rating(5.0)).is_empty());
        assert_eq!(validate_feedback(&FeedbackInput::rating(0.5))[0].rule, "range");
        assert_eq!(validate_feedback(&FeedbackInput::rating(5.5))[0].rule, "range");
    }

    #[test]
    fn test_rating_only_with_rating_type() {
        let input = FeedbackInput {
            feedback_type: FeedbackType::Like,
            rating: Some(4.0),
            comment: None,
        };
        assert_eq!(validate_feedback(&input)[0].rule, "forbidden");
        assert!(validate_feedback(&FeedbackInput::new(FeedbackType::Like)).is_empty());
    }

    #[test]
    fn test_comment_length() {
        let input = FeedbackInput::new(FeedbackType::Dislike).with_comment("x".repeat(1001));
        assert_eq!(validate_feedback(&input)[0].field, "comment");
    }
}
