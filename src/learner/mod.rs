// src/learner/mod.rs — Learning from recommendation feedback

pub mod feedback;
pub mod types;

pub use feedback::FeedbackLearningEngine;
