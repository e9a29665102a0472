// src/ranking/similarity.rs — Batch similarity scoring and ranking

use serde::{Deserialize, Serialize};

use super::vector::{cosine_similarity, normalize_score};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarityOptions {
    /// Candidates whose normalized score falls below this are dropped entirely.
    pub min_threshold: Option<f32>,
    pub top_k: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityScore {
    /// Position of the candidate in the input slice.
    pub index: usize,
    pub raw_score: f32,
    pub normalized_score: f32,
    /// 1-based.
    pub rank: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSimilarity {
    /// Surviving candidates in rank order.
    pub similarities: Vec<SimilarityScore>,
    pub ranked_indices: Vec<usize>,
    /// Mean normalized score of the returned candidates (0 when none survive).
    pub average_score: f32,
}

/// Scores candidate vectors against a query vector and ranks them.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimilarityRanker;

impl SimilarityRanker {
    pub fn new() -> Self {
        Self
    }

    /// Rank `candidates` by descending normalized cosine similarity to `query`.
    /// Equal scores keep ascending input order.
    pub fn calculate_batch_similarity(
        &self,
        query: &[f32],
        candidates: &[Vec<f32>],
        options: &SimilarityOptions,
    ) -> BatchSimilarity {
        let mut scored: Vec<SimilarityScore> = candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| {
                let raw_score = cosine_similarity(query, candidate);
                SimilarityScore {
                    index,
                    raw_score,
                    normalized_score: normalize_score(raw_score),
                    rank: 0,
                }
            })
            .filter(|s| match options.min_threshold {
                Some(min) => s.normalized_score >= min,
                None => true,
            })
            .collect();

        // sort_by is stable, so ties stay in index order.
        scored.sort_by(|a, b| b.normalized_score.total_cmp(&a.normalized_score));

        if let Some(k) = options.top_k {
            scored.truncate(k);
        }

        for (position, score) in scored.iter_mut().enumerate() {
            score.rank = position + 1;
        }

        let average_score = if scored.is_empty() {
            0.0
        } else {
            scored.iter().map(|s| s.normalized_score).sum::<f32>() / scored.len() as f32
        };

        BatchSimilarity {
            ranked_indices: scored.iter().map(|s| s.index).collect(),
            similarities: scored,
            average_score,
        }
    }
}
