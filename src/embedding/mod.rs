//! Embedding client abstraction and adapters.
//!
//! Two backends ship with the crate: an OpenAI-compatible `embeddings` HTTP client
//! and a deterministic byte-hashing embedder. The hashing backend needs no network
//! and always returns the same vector for the same text, which makes it the natural
//! double for tests and for offline runs of the question answering path.

use crate::config::{get_config, EmbeddingProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingClientError {
    /// Provider was unable to produce embeddings for the supplied input.
    #[error("Failed to generate embeddings: {0}")]
    GenerationFailed(String),
    /// Returned vector dimension does not match configuration.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension the caller configured.
        expected: usize,
        /// Dimension the provider returned.
        actual: usize,
    },
}

/// Interface implemented by embedding backends.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Produce one fixed-dimension vector per supplied text, in input order.
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingClientError>;

    /// Dimension of the vectors this client produces.
    fn dimension(&self) -> usize;
}

/// Embedding client for OpenAI-compatible `embeddings` endpoints.
pub struct HttpEmbeddingClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    dimension: usize,
}

impl HttpEmbeddingClient {
    /// Construct a client for the given endpoint, model, and expected dimension.
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        model: String,
        dimension: usize,
    ) -> Self {
        let http = Client::builder()
            .user_agent("docqa/embedding")
            .build()
            .expect("Failed to construct reqwest::Client for embeddings");
        Self {
            http,
            base_url,
            api_key,
            model,
            dimension,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/embeddings", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingClient for HttpEmbeddingClient {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        if texts.is_empty() {
            return Err(EmbeddingClientError::GenerationFailed(
                "no texts provided".to_string(),
            ));
        }

        let expected_count = texts.len();
        let payload = json!({
            "model": self.model,
            "input": texts,
        });

        let mut request = self.http.post(self.endpoint()).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|error| {
            EmbeddingClientError::GenerationFailed(format!(
                "failed to reach embedding API at {}: {error}",
                self.base_url
            ))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingClientError::GenerationFailed(format!(
                "embedding API returned {status}: {body}"
            )));
        }

        let body: EmbeddingResponse = response.json().await.map_err(|error| {
            EmbeddingClientError::GenerationFailed(format!(
                "failed to decode embedding response: {error}"
            ))
        })?;

        if body.data.len() != expected_count {
            return Err(EmbeddingClientError::GenerationFailed(format!(
                "embedding API returned {} vectors for {expected_count} inputs",
                body.data.len()
            )));
        }

        let mut data = body.data;
        data.sort_by_key(|datum| datum.index);

        let mut vectors = Vec::with_capacity(data.len());
        for datum in data {
            if datum.embedding.len() != self.dimension {
                return Err(EmbeddingClientError::DimensionMismatch {
                    expected: self.dimension,
                    actual: datum.embedding.len(),
                });
            }
            vectors.push(datum.embedding);
        }

        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Deterministic embedding client that folds byte content into a normalized vector.
///
/// Identical input always maps to an identical vector, so a text is at distance zero
/// to itself, which is exactly what retrieval tests and offline runs rely on.
pub struct HashEmbeddingClient {
    dimension: usize,
}

impl HashEmbeddingClient {
    /// Construct a hashing client producing vectors of the given dimension.
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn encode(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0_f32; self.dimension];
        if text.is_empty() || self.dimension == 0 {
            return embedding;
        }

        for (idx, byte) in text.bytes().enumerate() {
            let position = idx % self.dimension;
            embedding[position] += f32::from(byte) / 255.0;
        }

        let norm = embedding
            .iter()
            .map(|value| value * value)
            .sum::<f32>()
            .sqrt();
        if norm > 0.0 {
            for value in &mut embedding {
                *value /= norm;
            }
        }

        embedding
    }
}

#[async_trait]
impl EmbeddingClient for HashEmbeddingClient {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        if self.dimension == 0 {
            return Err(EmbeddingClientError::GenerationFailed(
                "embedding dimension must be greater than zero".to_string(),
            ));
        }
        if texts.is_empty() {
            return Err(EmbeddingClientError::GenerationFailed(
                "no texts provided".to_string(),
            ));
        }

        Ok(texts.iter().map(|text| self.encode(text)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Build an embedding client suitable for the current configuration.
pub fn get_embedding_client() -> Arc<dyn EmbeddingClient> {
    let config = get_config();
    match config.embedding_provider {
        EmbeddingProvider::Http => Arc::new(HttpEmbeddingClient::new(
            config
                .embedding_api_url
                .clone()
                .expect("EMBEDDING_API_URL is validated at config load"),
            config.embedding_api_key.clone(),
            config.embedding_model.clone(),
            config.embedding_dimension,
        )),
        EmbeddingProvider::Hash => Arc::new(HashEmbeddingClient::new(config.embedding_dimension)),
    }
}
