// src/lib.rs — Library root for project-recommender

pub mod analytics;
pub mod cache;
pub mod cli;
pub mod core;
pub mod infra;
pub mod learner;
pub mod memory;
pub mod provider;
pub mod ranking;
