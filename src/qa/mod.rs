//! Retrieval-backed question answering over an in-memory vector index.
//!
//! The engine embeds every chunk once at construction and keeps the vectors in a
//! flat index searched by squared Euclidean distance. Index position `i` always
//! resolves to `chunks[i]`; the engine is not re-indexable, so a new chunk
//! sequence means a new engine. Answers are generated from retrieved context only
//! and every failure path collapses into displayable text.

use crate::completion::{ChatMessage, CompletionClient, CompletionRequest};
use crate::embedding::{EmbeddingClient, EmbeddingClientError};
use std::sync::Arc;
use thiserror::Error;

/// Number of chunks retrieved per question unless overridden.
pub const DEFAULT_TOP_K: usize = 5;

const ANSWER_MAX_TOKENS: u32 = 400;
const ANSWER_TEMPERATURE: f32 = 0.3;

/// Errors raised while building the engine's index.
#[derive(Debug, Error)]
pub enum QaError {
    /// No chunks were supplied to index.
    #[error("cannot build an index over an empty chunk sequence")]
    NoChunks,
    /// Embedding provider failed to produce vectors for the chunks.
    #[error("Failed to generate embeddings: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// Provider returned a different number of vectors than chunks supplied.
    #[error("embedding count mismatch: {expected} chunks, {actual} vectors")]
    CountMismatch {
        /// Number of chunks submitted.
        expected: usize,
        /// Number of vectors returned.
        actual: usize,
    },
}

/// Flat in-memory nearest-neighbor index over fixed-dimension vectors.
///
/// Search is an exhaustive scan by squared L2 distance, which is exact and more
/// than fast enough for the per-document chunk counts this pipeline produces.
pub struct VectorIndex {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl VectorIndex {
    /// Build an index over the given vectors.
    pub fn new(dimension: usize, vectors: Vec<Vec<f32>>) -> Self {
        debug_assert!(vectors.iter().all(|v| v.len() == dimension));
        Self { dimension, vectors }
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the index holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Dimension of the stored vectors.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Return up to `k` stored positions closest to `query`, ascending by
    /// squared L2 distance. Fewer than `k` results are returned when fewer
    /// vectors are stored; no sentinel positions are ever produced.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, vector)| (position, squared_l2(query, vector)))
            .collect();

        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let diff = x - y;
            diff * diff
        })
        .sum()
}

/// Question answering engine over one document's chunks.
pub struct QaEngine {
    chunks: Vec<String>,
    index: VectorIndex,
    embedder: Arc<dyn EmbeddingClient>,
    completion: Arc<dyn CompletionClient>,
    top_k: usize,
}

impl QaEngine {
    /// Embed the chunk sequence and build the index.
    ///
    /// The transition to the indexed state happens here, once and synchronously;
    /// afterwards the engine only reads the index, so concurrent `answer` calls
    /// are safe.
    pub async fn build(
        chunks: Vec<String>,
        embedder: Arc<dyn EmbeddingClient>,
        completion: Arc<dyn CompletionClient>,
        top_k: usize,
    ) -> Result<Self, QaError> {
        if chunks.is_empty() {
            return Err(QaError::NoChunks);
        }

        tracing::info!(chunks = chunks.len(), "Building QA index");
        let vectors = embedder.embed(chunks.clone()).await?;
        if vectors.len() != chunks.len() {
            return Err(QaError::CountMismatch {
                expected: chunks.len(),
                actual: vectors.len(),
            });
        }

        let index = VectorIndex::new(embedder.dimension(), vectors);
        Ok(Self {
            chunks,
            index,
            embedder,
            completion,
            top_k: top_k.max(1),
        })
    }

    /// Retrieve the most relevant chunk texts for a question, joined by blank lines.
    pub async fn retrieve(&self, question: &str) -> Result<String, EmbeddingClientError> {
        let mut vectors = self.embedder.embed(vec![question.to_string()]).await?;
        let query = vectors.pop().ok_or_else(|| {
            EmbeddingClientError::GenerationFailed("provider returned no query vector".into())
        })?;

        let hits = self.index.search(&query, self.top_k);
        let relevant: Vec<&str> = hits
            .iter()
            // Guard against any index/result mismatch; positions past the chunk
            // sequence are dropped rather than trusted.
            .filter(|(position, _)| *position < self.chunks.len())
            .map(|(position, _)| self.chunks[*position].as_str())
            .collect();

        Ok(relevant.join("\n\n"))
    }

    /// Answer a question from retrieved context.
    ///
    /// Never fails: retrieval or generation errors come back as a string of the
    /// form `Error: <description>`, ready for direct display. Nothing is cached;
    /// a repeated question re-runs embed, search, and generation.
    pub async fn answer(&self, question: &str) -> String {
        let context = match self.retrieve(question).await {
            Ok(context) => context,
            Err(error) => return format!("Error: {error}"),
        };

        let request = CompletionRequest {
            messages: vec![
                ChatMessage::system(
                    "You are a helpful assistant. Answer the question using only the provided \
                     context. If the answer is not in the context, say so.",
                ),
                ChatMessage::user(format!("Context:\n{context}\n\nQuestion: {question}")),
            ],
            max_tokens: ANSWER_MAX_TOKENS,
            temperature: ANSWER_TEMPERATURE,
        };

        match self.completion.complete(request).await {
            Ok(answer) => answer.trim().to_string(),
            Err(error) => format!("Error: {error}"),
        }
    }

    /// Number of chunks backing the index.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }
}
