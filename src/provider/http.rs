// src/provider/http.rs — Client for the local sentence-embedding service
//
// POST {base}/embed   {"texts": [...], "normalize": true}
//   -> {"embeddings": [[f32]], "model": "...", "dimensions": 384}
// GET  {base}/health  -> {"status": "healthy", "model": "...", "model_loaded": true}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::{estimate_tokens, EmbeddingBatch, EmbeddingProvider};
use crate::infra::config::EmbeddingConfig;
use crate::infra::errors::RecommenderError;

/// The service rejects larger requests with 400.
pub const MAX_TEXTS_PER_REQUEST: usize = 100;

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [String],
    normalize: bool,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
    #[allow(dead_code)]
    model: String,
    dimensions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    pub model: String,
    pub model_loaded: bool,
}

pub struct HttpEmbeddingProvider {
    base_url: String,
    normalize: bool,
    client: reqwest::Client,
}

fn provider_error(message: impl Into<String>) -> RecommenderError {
    RecommenderError::Embedding {
        message: message.into(),
    }
}

impl HttpEmbeddingProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            normalize: true,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &EmbeddingConfig) -> Self {
        let mut provider = Self::new(config.url.clone());
        provider.normalize = config.normalize;
        provider
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<ServiceHealth, RecommenderError> {
        let resp = self
            .client
            .get(format!("{}/health", self.base_url))
            .timeout(Duration::from_secs(3))
            .send()
            .await
            .map_err(|e| provider_error(format!("Cannot reach embedding service: {e}")))?;

        resp.json::<ServiceHealth>()
            .await
            .map_err(|e| provider_error(format!("Invalid health response: {e}")))
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    fn id(&self) -> &str {
        "http"
    }

    async fn generate_embeddings(
        &self,
        texts: &[String],
    ) -> Result<EmbeddingBatch, RecommenderError> {
        if texts.is_empty() {
            return Err(provider_error("No texts provided"));
        }
        if texts.len() > MAX_TEXTS_PER_REQUEST {
            return Err(provider_error(format!(
                "Maximum {MAX_TEXTS_PER_REQUEST} texts per request, got {}",
                texts.len()
            )));
        }

        let started = Instant::now();
        let response = self
            .client
            .post(format!("{}/embed", self.base_url))
            .json(&EmbedRequest {
                texts,
                normalize: self.normalize,
            })
            .send()
            .await
            .map_err(|e| provider_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(provider_error(format!("HTTP {status}: {body}")));
        }

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| provider_error(format!("Invalid embedding response: {e}")))?;

        if body.embeddings.len() != texts.len() {
            return Err(provider_error(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                body.embeddings.len()
            )));
        }
        if body.embeddings.iter().any(|e| e.len() != body.dimensions) {
            return Err(provider_error("Embedding dimensions are inconsistent"));
        }

        tracing::debug!(
            "Embedded {} texts ({} dims) in {}ms",
            texts.len(),
            body.dimensions,
            started.elapsed().as_millis()
        );

        Ok(EmbeddingBatch {
            embeddings: body.embeddings,
            tokens_used: texts.iter().map(|t| estimate_tokens(t)).sum(),
            processing_time_ms: started.elapsed().as_millis() as u64,
            from_cache: false,
        })
    }
}
