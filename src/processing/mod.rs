//! Text preprocessing pipeline: cleaning and overlapping chunk segmentation.

pub mod chunking;
pub mod sanitize;

pub use chunking::{chunk_text, ChunkingError, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
pub use sanitize::clean_text;

/// Full preprocessing pass: clean the raw extracted text, then split it into
/// overlapping chunks using the default size and overlap.
///
/// Empty cleaned text yields an empty chunk sequence.
pub fn preprocess(raw_text: &str) -> Vec<String> {
    let cleaned = clean_text(raw_text);
    chunk_text(&cleaned, DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
        .expect("default chunk parameters are valid")
}

/// Preprocess with explicit chunk parameters.
pub fn preprocess_with(
    raw_text: &str,
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<String>, ChunkingError> {
    let cleaned = clean_text(raw_text);
    chunk_text(&cleaned, chunk_size, overlap)
}
