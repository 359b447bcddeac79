//! Fixed-stride character chunking with overlap.
//!
//! Chunks exist to keep each downstream model call inside its context window while
//! letting consecutive chunks share a margin of text, so sentences split at a
//! boundary remain visible to both sides. The scan advances by `size - overlap`
//! from position 0; every window is trimmed and appended when non-empty. The
//! position always advances by the fixed stride, even when a window trims to
//! nothing, so coverage follows directly from the stride arithmetic.

use thiserror::Error;

/// Default chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1500;
/// Default overlap between consecutive chunks in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 150;

/// Errors produced while splitting cleaned text into chunks.
#[derive(Debug, Error)]
pub enum ChunkingError {
    /// Caller configured an impossible chunk size.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
    /// Overlap must leave a positive stride between chunk starts.
    #[error("chunk overlap ({overlap}) must be smaller than chunk size ({chunk_size})")]
    OverlapTooLarge {
        /// Requested overlap in characters.
        overlap: usize,
        /// Requested chunk size in characters.
        chunk_size: usize,
    },
}

/// Split text into overlapping chunks of at most `chunk_size` characters.
///
/// Consecutive chunks overlap by up to `overlap` characters (less at the tail).
/// A final chunk shorter than `chunk_size` is still emitted when it trims to
/// something non-empty. Returns an empty vector for empty input.
pub fn chunk_text(
    text: &str,
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<String>, ChunkingError> {
    if chunk_size == 0 {
        return Err(ChunkingError::InvalidChunkSize);
    }
    if overlap >= chunk_size {
        return Err(ChunkingError::OverlapTooLarge {
            overlap,
            chunk_size,
        });
    }

    let chars: Vec<char> = text.chars().collect();
    let stride = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        let window: String = chars[start..end].iter().collect();
        let trimmed = window.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
        start += stride;
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterned_text(len: usize) -> String {
        // Non-repeating printable filler so slice positions are distinguishable.
        (0..len)
            .map(|i| char::from(b'a' + (i % 23) as u8))
            .collect()
    }

    #[test]
    fn short_text_yields_one_trimmed_chunk() {
        let chunks = chunk_text("  a short document  ", 1500, 150).expect("chunking");
        assert_eq!(chunks, vec!["a short document"]);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        let chunks = chunk_text("", 1500, 150).expect("chunking");
        assert!(chunks.is_empty());
    }

    #[test]
    fn three_thousand_chars_split_into_three_documented_windows() {
        let text = patterned_text(3000);
        let chunks = chunk_text(&text, 1500, 150).expect("chunking");
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0], text[0..1500]);
        assert_eq!(chunks[1], text[1350..2850]);
        assert_eq!(chunks[2], text[2700..3000]);
    }

    #[test]
    fn chunk_count_matches_stride_formula() {
        let (size, overlap) = (100, 20);
        for len in [1_usize, 80, 100, 101, 500, 999] {
            let text = patterned_text(len);
            let chunks = chunk_text(&text, size, overlap).expect("chunking");
            // One chunk per stride step that starts inside the text.
            let expected = len.div_ceil(size - overlap);
            assert_eq!(chunks.len(), expected, "len={len}");
        }
    }

    #[test]
    fn consecutive_chunks_share_the_overlap_margin() {
        let text = patterned_text(400);
        let chunks = chunk_text(&text, 100, 20).expect("chunking");
        for pair in chunks.windows(2) {
            let tail = &pair[0][pair[0].len() - 20..];
            assert!(pair[1].starts_with(tail));
        }
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        assert!(matches!(
            chunk_text("hello", 0, 0),
            Err(ChunkingError::InvalidChunkSize)
        ));
    }

    #[test]
    fn overlap_at_or_above_chunk_size_is_rejected() {
        assert!(matches!(
            chunk_text("hello", 10, 10),
            Err(ChunkingError::OverlapTooLarge { .. })
        ));
    }
}
