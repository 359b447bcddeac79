//! Map-reduce summarization over the completion client.
//!
//! Each chunk is summarized independently so every call stays inside the model's
//! context window, then one consolidation call merges the partial summaries back
//! into a single coherent text. Provider failures during the map phase skip the
//! affected chunk after a backoff instead of aborting the run; the caller always
//! receives displayable text, with a fixed sentinel marking total failure.

use crate::completion::{ChatMessage, CompletionClient, CompletionRequest};
use std::sync::Arc;
use std::time::Duration;

/// Sentinel returned when no chunk could be summarized, distinguishable from any
/// real summary and never empty.
pub const SUMMARY_FAILED: &str = "Could not generate summary.";

/// Tuning knobs for the map-reduce summarization run.
///
/// Delays implement rate-limit courtesy toward hosted providers and are kept out
/// of the summarization logic itself; tests run with both set to zero.
#[derive(Debug, Clone)]
pub struct SummarizeOptions {
    /// Chunks whose trimmed length falls below this are treated as noise.
    pub min_chunk_chars: usize,
    /// Upper bound on chunk characters sent to a map call.
    pub map_input_limit: usize,
    /// Upper bound on merged characters sent to the reduce call.
    pub reduce_input_limit: usize,
    /// Token budget for each map call.
    pub map_max_tokens: u32,
    /// Token budget for the reduce call.
    pub reduce_max_tokens: u32,
    /// Sampling temperature for all calls.
    pub temperature: f32,
    /// Pause between successive map calls.
    pub inter_call_delay: Duration,
    /// Pause after a failed map call before moving on.
    pub failure_backoff: Duration,
}

impl Default for SummarizeOptions {
    fn default() -> Self {
        Self {
            min_chunk_chars: 50,
            map_input_limit: 3000,
            reduce_input_limit: 6000,
            map_max_tokens: 300,
            reduce_max_tokens: 800,
            temperature: 0.3,
            inter_call_delay: Duration::from_millis(500),
            failure_backoff: Duration::from_secs(5),
        }
    }
}

/// Map-reduce summarizer backed by a completion client.
pub struct Summarizer {
    client: Arc<dyn CompletionClient>,
    options: SummarizeOptions,
}

impl Summarizer {
    /// Build a summarizer with default options.
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self::with_options(client, SummarizeOptions::default())
    }

    /// Build a summarizer with explicit options.
    pub fn with_options(client: Arc<dyn CompletionClient>, options: SummarizeOptions) -> Self {
        Self { client, options }
    }

    /// Summarize the chunk sequence into one consolidated text.
    ///
    /// Never fails: provider errors are logged and recovered from, and a run in
    /// which no chunk produced a usable partial summary returns [`SUMMARY_FAILED`].
    pub async fn summarize(&self, chunks: &[String]) -> String {
        tracing::info!(chunks = chunks.len(), "Summarizing document");

        let mut partials = Vec::new();
        for (index, chunk) in chunks.iter().enumerate() {
            if chunk.trim().chars().count() < self.options.min_chunk_chars {
                tracing::debug!(chunk = index, "Skipping chunk below minimum length");
                continue;
            }

            tracing::debug!(chunk = index + 1, total = chunks.len(), "Summarizing chunk");
            if let Some(summary) = self.summarize_chunk(chunk).await {
                partials.push(summary);
            }
            tokio::time::sleep(self.options.inter_call_delay).await;
        }

        if partials.is_empty() {
            tracing::warn!("No chunk produced a partial summary");
            return SUMMARY_FAILED.to_string();
        }

        self.consolidate(&partials).await
    }

    async fn summarize_chunk(&self, chunk: &str) -> Option<String> {
        let excerpt = truncate_chars(chunk, self.options.map_input_limit);
        let request = CompletionRequest {
            messages: vec![
                ChatMessage::system(
                    "You are a helpful assistant that summarizes text clearly and concisely.",
                ),
                ChatMessage::user(format!(
                    "Summarize the following text in 3-5 sentences:\n\n{excerpt}"
                )),
            ],
            max_tokens: self.options.map_max_tokens,
            temperature: self.options.temperature,
        };

        match self.client.complete(request).await {
            Ok(summary) if !summary.trim().is_empty() => Some(summary.trim().to_string()),
            Ok(_) => None,
            Err(error) => {
                tracing::warn!(%error, "Chunk summarization failed; skipping chunk");
                tokio::time::sleep(self.options.failure_backoff).await;
                None
            }
        }
    }

    async fn consolidate(&self, partials: &[String]) -> String {
        tracing::info!(partials = partials.len(), "Consolidating partial summaries");
        let merged = truncate_chars(&partials.join(" "), self.options.reduce_input_limit);
        let request = CompletionRequest {
            messages: vec![
                ChatMessage::system(
                    "You are a helpful assistant. Consolidate the following partial summaries \
                     into one coherent, well-structured summary.",
                ),
                ChatMessage::user(format!(
                    "Consolidate these summaries into a single comprehensive summary:\n\n{merged}"
                )),
            ],
            max_tokens: self.options.reduce_max_tokens,
            temperature: self.options.temperature,
        };

        match self.client.complete(request).await {
            Ok(summary) if !summary.trim().is_empty() => summary.trim().to_string(),
            Ok(_) => {
                tracing::warn!("Consolidation returned empty text");
                SUMMARY_FAILED.to_string()
            }
            Err(error) => {
                tracing::warn!(%error, "Consolidation call failed");
                SUMMARY_FAILED.to_string()
            }
        }
    }
}

/// Truncate to at most `limit` characters without splitting a character.
fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
