#![deny(missing_docs)]

//! Core library for the docqa pipeline: validate a PDF, extract its text, split it
//! into overlapping chunks, produce a map-reduce summary, and answer questions from
//! the most relevant chunks.

/// Language-model completion client abstraction and HTTP adapter.
pub mod completion;
/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and adapters.
pub mod embedding;
/// PDF text extraction with a layout-aware fallback pass.
pub mod extract;
/// Structured logging and tracing setup.
pub mod logging;
/// Text cleaning and overlapping chunk segmentation.
pub mod processing;
/// Retrieval question answering engine and vector index.
pub mod qa;
/// Map-reduce summarization.
pub mod summarize;
/// Upfront PDF validation.
pub mod validate;
