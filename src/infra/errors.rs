// src/infra/errors.rs — Error types for the recommender

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single failed validation rule on an input field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub field: String,
    pub rule: String,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(field: &str, rule: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            rule: rule.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum RecommenderError {
    // Caller errors (surfaced)
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Student profile is incomplete, missing: {}", missing_fields.join(", "))]
    InvalidProfile { missing_fields: Vec<String> },

    #[error("Invalid input: {}", describe_failures(failures))]
    InvalidInput { failures: Vec<ValidationFailure> },

    #[error("No approved projects match the requested filters")]
    NoCandidates,

    // Embedding service (aborts generation)
    #[error("Embedding service error: {message}")]
    Embedding { message: String },

    #[error("Embedding service did not answer within {timeout_ms}ms")]
    EmbeddingTimeout { timeout_ms: u64 },

    // Infra
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(anyhow::Error),
}

// Store plumbing reports through anyhow; recover the typed cause when there is one.
impl From<anyhow::Error> for RecommenderError {
    fn from(err: anyhow::Error) -> Self {
        let err = match err.downcast::<rusqlite::Error>() {
            Ok(db) => return RecommenderError::Database(db),
            Err(err) => err,
        };
        match err.downcast::<std::io::Error>() {
            Ok(io) => RecommenderError::Io(io),
            Err(err) => RecommenderError::Other(err),
        }
    }
}

impl RecommenderError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        RecommenderError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Single-field shorthand for `InvalidInput`.
    pub fn invalid_input(field: &str, rule: &str, message: impl Into<String>) -> Self {
        RecommenderError::InvalidInput {
            failures: vec![ValidationFailure::new(field, rule, message)],
        }
    }

    /// Errors that belong to the caller's request rather than to our dependencies.
    pub fn is_surfaced(&self) -> bool {
        matches!(
            self,
            RecommenderError::NotFound { .. }
                | RecommenderError::InvalidProfile { .. }
                | RecommenderError::InvalidInput { .. }
                | RecommenderError::NoCandidates
        )
    }
}

fn describe_failures(failures: &[ValidationFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.field, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, RecommenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_profile_names_every_field() {
        let err = RecommenderError::InvalidProfile {
            missing_fields: vec!["skills".into(), "interests".into()],
        };
        assert_eq!(
            err.to_string(),
            "Student profile is incomplete, missing: skills, interests"
        );
    }

    #[test]
    fn test_invalid_input_message() {
        let err = RecommenderError::invalid_input("rating", "required", "rating is required");
        assert_eq!(err.to_string(), "Invalid input: rating (rating is required)");
    }

    #[test]
    fn test_store_errors_keep_their_type() {
        let db: anyhow::Error = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(RecommenderError::from(db), RecommenderError::Database(_)));

        let io: anyhow::Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(RecommenderError::from(io), RecommenderError::Io(_)));

        let other = anyhow::anyhow!("lock poisoned");
        assert!(matches!(RecommenderError::from(other), RecommenderError::Other(_)));
    }

    #[test]
    fn test_surfaced_classification() {
        assert!(RecommenderError::NoCandidates.is_surfaced());
        assert!(RecommenderError::not_found("Student", "s-1").is_surfaced());
        assert!(!RecommenderError::EmbeddingTimeout { timeout_ms: 10 }.is_surfaced());
        assert!(!RecommenderError::Config("bad".into()).is_surfaced());
    }
}
