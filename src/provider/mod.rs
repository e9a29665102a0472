// src/provider/mod.rs — External collaborators: embeddings and text processing

pub mod http;
pub mod text;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::infra::errors::RecommenderError;

/// Output of one batch embedding call. `embeddings[i]` belongs to `texts[i]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingBatch {
    pub embeddings: Vec<Vec<f32>>,
    pub tokens_used: u32,
    pub processing_time_ms: u64,
    pub from_cache: bool,
}

/// Turns text into vectors. Implementations must preserve input order 1:1.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn id(&self) -> &str;

    async fn generate_embeddings(&self, texts: &[String])
        -> Result<EmbeddingBatch, RecommenderError>;
}

/// Rough token estimate (~4 chars per token).
pub fn estimate_tokens(text: &str) -> u32 {
    (text.chars().count() as f32 / 4.0).ceil() as u32
}
