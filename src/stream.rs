//! Streaming analysis API: emit chunk summaries as they complete.
//!
//! ## Why stream?
//!
//! A long document at 5 s–50 s per chunk (retries included) can take
//! minutes. A stream lets callers display partial summaries immediately or
//! persist them incrementally instead of waiting for the whole run.
//!
//! Unlike the eager [`crate::analyze::analyze`], which also extracts
//! images, the stream covers the summarization phase only. Execution stays
//! strictly sequential — one request in flight, each completing before the
//! next begins — so items arrive in chunk (document) order and the caller
//! can concatenate successful summaries as they come without reordering.

use crate::config::AnalysisConfig;
use crate::error::PdfSumError;
use crate::output::{ChunkOutcome, ChunkSummary};
use crate::pipeline::summarize::Summarizer;
use crate::pipeline::{chunk, extract, input};
use crate::progress::ProgressCallback;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of per-chunk outcomes, in document order.
pub type ChunkOutcomeStream = Pin<Box<dyn Stream<Item = ChunkOutcome> + Send>>;

/// Summarize a PDF, streaming chunk outcomes as they are ready.
///
/// # Returns
/// - `Ok(ChunkOutcomeStream)` — one [`ChunkOutcome`] per chunk, in order;
///   failed chunks appear as [`ChunkSummary::NoSummary`] items
/// - `Err(PdfSumError)` — fatal error (bad input, missing credential, or —
///   unlike the eager API, which degrades to an empty summary — an
///   unreadable text layer, since a summaries-only stream has nothing
///   else to offer)
pub async fn analyze_stream(
    input_str: impl AsRef<str>,
    config: &AnalysisConfig,
) -> Result<ChunkOutcomeStream, PdfSumError> {
    let input_str = input_str.as_ref();
    info!("Starting streaming analysis: {}", input_str);

    // Refuse before touching the filesystem or downloading anything.
    let summarizer = crate::analyze::resolve_summarizer(config)?;

    let bytes = input::resolve_input(input_str, config.download_timeout_secs).await?;

    let text = extract::extract_text(&bytes).await?;
    let chunks = chunk::chunk_text(&text, config.chunk_size);

    Ok(outcome_stream(
        chunks,
        summarizer,
        config.progress_callback.clone(),
    ))
}

/// Build the sequential outcome stream over pre-chunked text.
pub(crate) fn outcome_stream(
    chunks: Vec<String>,
    summarizer: Arc<dyn Summarizer>,
    progress: Option<ProgressCallback>,
) -> ChunkOutcomeStream {
    let total = chunks.len();
    if let Some(ref cb) = progress {
        cb.on_run_start(total);
    }

    let s = stream::iter(chunks.into_iter().enumerate()).then(move |(index, chunk_text)| {
        let summarizer = Arc::clone(&summarizer);
        let progress = progress.clone();
        async move {
            if let Some(ref cb) = progress {
                cb.on_chunk_start(index, total);
            }

            let start = Instant::now();
            let summary = summarizer.summarize_chunk(&chunk_text).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            if let Some(ref cb) = progress {
                match &summary {
                    ChunkSummary::Summary(s) => cb.on_chunk_complete(index, total, s.len()),
                    ChunkSummary::NoSummary => cb.on_chunk_failed(index, total),
                }
            }

            ChunkOutcome {
                index,
                chars: chunk_text.chars().count(),
                summary,
                duration_ms,
            }
        }
    });

    Box::pin(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct UppercaseFirstWord;

    #[async_trait]
    impl Summarizer for UppercaseFirstWord {
        async fn summarize_chunk(&self, chunk: &str) -> ChunkSummary {
            match chunk.split_whitespace().next() {
                Some(w) if w != "skip" => ChunkSummary::Summary(w.to_uppercase()),
                _ => ChunkSummary::NoSummary,
            }
        }
    }

    #[tokio::test]
    async fn stream_yields_outcomes_in_chunk_order() {
        let chunks: Vec<String> = ["alpha a", "beta b", "gamma c"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let outcomes: Vec<ChunkOutcome> =
            outcome_stream(chunks, Arc::new(UppercaseFirstWord), None)
                .collect()
                .await;

        assert_eq!(
            outcomes
                .iter()
                .map(|o| (o.index, o.summary.as_str().map(String::from)))
                .collect::<Vec<_>>(),
            vec![
                (0, Some("ALPHA".to_string())),
                (1, Some("BETA".to_string())),
                (2, Some("GAMMA".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn failed_chunks_appear_as_no_summary_items() {
        let chunks: Vec<String> = ["alpha", "skip this", "gamma"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let outcomes: Vec<ChunkOutcome> =
            outcome_stream(chunks, Arc::new(UppercaseFirstWord), None)
                .collect()
                .await;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].summary.is_summary());
        assert_eq!(outcomes[1].summary, ChunkSummary::NoSummary);
        assert!(outcomes[2].summary.is_summary());
    }

    #[tokio::test]
    async fn stream_refuses_without_credential_before_touching_input() {
        if std::env::var("HF_TOKEN").is_ok() {
            return; // cannot observe the refusal with a real token present
        }
        let config = AnalysisConfig::default();
        // A nonexistent path: the credential refusal must win over the
        // file-not-found error, proving no input I/O happened first.
        let result = analyze_stream("/no/such/dir/missing.pdf", &config).await;
        assert!(matches!(result, Err(PdfSumError::MissingCredential)));
    }

    #[tokio::test]
    async fn empty_chunk_list_is_an_empty_stream() {
        let outcomes: Vec<ChunkOutcome> =
            outcome_stream(Vec::new(), Arc::new(UppercaseFirstWord), None)
                .collect()
                .await;
        assert!(outcomes.is_empty());
    }
}
