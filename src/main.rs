//! Command-line shell for the docqa pipeline.

use anyhow::{bail, Context};
use clap::Parser;
use docqa::completion::get_completion_client;
use docqa::embedding::get_embedding_client;
use docqa::processing::{preprocess_with, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use docqa::qa::{QaEngine, DEFAULT_TOP_K};
use docqa::summarize::Summarizer;
use docqa::validate::{validate_pdf_with_limit, DEFAULT_MAX_PDF_SIZE_MB};
use docqa::{config, extract, logging};
use std::path::PathBuf;

/// Extracted text shorter than this is treated as an unusable extraction.
const MIN_USABLE_TEXT_CHARS: usize = 50;

/// Summarize a PDF and answer questions about its content.
#[derive(Debug, Parser)]
#[command(name = "docqa", version)]
struct Cli {
    /// Path to the PDF document.
    pdf: PathBuf,

    /// Question to answer from the document; may be repeated.
    #[arg(long = "ask", value_name = "QUESTION")]
    questions: Vec<String>,

    /// Write the generated summary to this file as well as stdout.
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    config::init_config();
    logging::init_tracing();
    let config = config::get_config();

    let max_mb = config.max_pdf_size_mb.unwrap_or(DEFAULT_MAX_PDF_SIZE_MB);
    let validation = validate_pdf_with_limit(&cli.pdf, max_mb);
    if !validation.valid {
        bail!("Invalid PDF: {}", validation.message);
    }
    println!("{}", validation.message);

    let raw_text = extract::extract_text(&cli.pdf)?;
    if raw_text.chars().count() < MIN_USABLE_TEXT_CHARS {
        bail!("Could not extract text. The PDF may be scanned or image-based.");
    }

    let chunk_size = config.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE);
    let overlap = config.chunk_overlap.unwrap_or(DEFAULT_CHUNK_OVERLAP);
    let chunks = preprocess_with(&raw_text, chunk_size, overlap)?;
    tracing::info!(chunks = chunks.len(), chunk_size, overlap, "Text preprocessed");
    if chunks.is_empty() {
        bail!("Document contained no usable text after cleaning.");
    }

    let completion = get_completion_client();
    let summarizer = Summarizer::new(completion.clone());
    let summary = summarizer.summarize(&chunks).await;
    println!("\n=== Summary ===\n{summary}");

    if let Some(path) = &cli.output {
        std::fs::write(path, &summary)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        println!("\nSummary written to {}", path.display());
    }

    if !cli.questions.is_empty() {
        let top_k = config.retrieval_top_k.unwrap_or(DEFAULT_TOP_K);
        let engine = QaEngine::build(chunks, get_embedding_client(), completion, top_k)
            .await
            .context("failed to build the question answering index")?;

        for question in &cli.questions {
            let answer = engine.answer(question).await;
            println!("\nQ: {question}\nA: {answer}");
        }
    }

    Ok(())
}
