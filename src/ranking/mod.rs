// src/ranking/mod.rs — Vector similarity and ranking

pub mod similarity;
pub mod vector;

pub use similarity::{BatchSimilarity, SimilarityOptions, SimilarityRanker, SimilarityScore};
