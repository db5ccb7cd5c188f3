//! Eager (full-document) analysis entry points.
//!
//! One call takes a PDF from bytes (or path/URL) to an aggregate summary
//! plus its content-bearing images:
//!
//! ```text
//! INIT ─▶ EXTRACT_TEXT ─▶ CHUNK ─▶ SUMMARIZE_EACH ─▶ AGGREGATE ─▶ EXTRACT_IMAGES ─▶ DONE
//! ```
//!
//! Chunks are summarized strictly sequentially, each request completing
//! (retries and backoff included) before the next begins, so chunk-result
//! order is the document order by construction and the aggregate summary
//! reads front-to-back. A failed chunk is recorded and skipped — partial
//! success always beats total failure. Only a missing credential or an
//! unresolvable input aborts the run; an unreadable text layer merely
//! skips the summary phase, and the image phase still runs (the two
//! extraction passes are independent).

use crate::config::AnalysisConfig;
use crate::error::{AnalysisWarning, PdfSumError};
use crate::output::{aggregate_summary, AnalysisOutput, AnalysisStats, ChunkOutcome, ChunkSummary};
use crate::pipeline::summarize::{HfSummaryClient, Summarizer};
use crate::pipeline::{chunk, extract, input};
use crate::progress::ProgressCallback;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Analyze a PDF file or URL: summarize its text and extract its images.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `input_str` — Local file path or HTTP/HTTPS URL to a PDF
/// * `config`    — Run configuration
///
/// # Returns
/// `Ok(AnalysisOutput)` on success, even if some (or all) chunks failed to
/// summarize or the text layer was unreadable — check
/// `output.stats.failed_chunks` and `output.warnings`.
///
/// # Errors
/// Returns `Err(PdfSumError)` only for run-fatal conditions:
/// - Missing credential (and no injected summarizer)
/// - File not found / permission denied / download failure
/// - Input is not a PDF
pub async fn analyze(
    input_str: impl AsRef<str>,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, PdfSumError> {
    let input_str = input_str.as_ref();
    info!("Starting analysis: {}", input_str);

    // Refuse before touching the filesystem or downloading anything.
    resolve_summarizer(config)?;

    let bytes = input::resolve_input(input_str, config.download_timeout_secs).await?;
    analyze_bytes(&bytes, config).await
}

/// Analyze in-memory PDF bytes.
///
/// The recommended API when the document comes from an upload, database,
/// or network stream rather than a file on disk. The buffer is read twice
/// (text pass, image pass); both passes start from the beginning.
pub async fn analyze_bytes(
    pdf: &[u8],
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, PdfSumError> {
    let total_start = Instant::now();

    // Refuse to start without a way to summarize — before any extraction
    // or network work.
    let summarizer = resolve_summarizer(config)?;

    input::validate_magic(pdf, "<bytes>")?;

    let mut warnings: Vec<AnalysisWarning> = Vec::new();

    // ── Phase 1: text ────────────────────────────────────────────────────
    let text_start = Instant::now();
    let text = match extract::extract_text(pdf).await {
        Ok(t) => t,
        Err(e) => {
            warn!("Text extraction failed, skipping summary phase: {}", e);
            warnings.push(AnalysisWarning::TextExtraction {
                detail: e.to_string(),
            });
            String::new()
        }
    };
    let text_duration_ms = text_start.elapsed().as_millis() as u64;
    let extracted_chars = text.chars().count();

    // ── Phase 2: chunk + summarize ───────────────────────────────────────
    let chunks = chunk::chunk_text(&text, config.chunk_size);
    info!("Summarizing {} chunks", chunks.len());

    let summarize_start = Instant::now();
    let chunk_outcomes = summarize_chunks(
        &chunks,
        summarizer.as_ref(),
        config.progress_callback.as_ref(),
    )
    .await;
    let summarize_duration_ms = summarize_start.elapsed().as_millis() as u64;

    let summary = aggregate_summary(&chunk_outcomes);
    let summarized = chunk_outcomes
        .iter()
        .filter(|c| c.summary.is_summary())
        .count();

    // ── Phase 3: images (always attempted, independent of phases 1–2) ────
    let image_start = Instant::now();
    let images = if config.extract_images {
        let (images, image_warnings) = extract::extract_images(pdf).await;
        warnings.extend(image_warnings);
        images
    } else {
        Vec::new()
    };
    let image_duration_ms = image_start.elapsed().as_millis() as u64;

    let stats = AnalysisStats {
        extracted_chars,
        total_chunks: chunk_outcomes.len(),
        summarized_chunks: summarized,
        failed_chunks: chunk_outcomes.len() - summarized,
        image_count: images.len(),
        text_duration_ms,
        summarize_duration_ms,
        image_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Analysis complete: {}/{} chunks summarized, {} images, {}ms total",
        stats.summarized_chunks, stats.total_chunks, stats.image_count, stats.total_duration_ms
    );

    Ok(AnalysisOutput {
        summary,
        chunks: chunk_outcomes,
        images,
        warnings,
        stats,
    })
}

/// Analyze a PDF and write the aggregate summary to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn analyze_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &AnalysisConfig,
) -> Result<AnalysisStats, PdfSumError> {
    let output = analyze(input_str, config).await?;
    let path = output_path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PdfSumError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                })?;
        }
    }

    let tmp_path = staging_path(path);
    tokio::fs::write(&tmp_path, &output.summary)
        .await
        .map_err(|e| PdfSumError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(PdfSumError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        });
    }

    Ok(output.stats)
}

/// Staging path for the atomic write: the full file name plus `.tmp`, so
/// `summary.md` stages at `summary.md.tmp` and two outputs differing only
/// by extension never share a staging path.
fn staging_path(path: &Path) -> std::path::PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Synchronous wrapper around [`analyze`].
///
/// Creates a temporary tokio runtime internally.
pub fn analyze_sync(
    input_str: impl AsRef<str>,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, PdfSumError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PdfSumError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(analyze(input_str, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Resolve the summarizer, from most-specific to least-specific.
///
/// 1. **Injected summarizer** (`config.summarizer`) — the caller built it
///    entirely; used as-is. This is how tests run the pipeline without a
///    network.
/// 2. **Explicit credential** (`config.credential`) — HTTP client against
///    the configured router.
/// 3. **`HF_TOKEN` environment variable** — the conventional place the
///    token lives in shells and CI.
///
/// With none of the three, the run refuses to start.
pub(crate) fn resolve_summarizer(
    config: &AnalysisConfig,
) -> Result<Arc<dyn Summarizer>, PdfSumError> {
    if let Some(ref summarizer) = config.summarizer {
        return Ok(Arc::clone(summarizer));
    }

    let credential = match config.credential.clone() {
        Some(token) if !token.is_empty() => token,
        _ => match std::env::var("HF_TOKEN") {
            Ok(token) if !token.is_empty() => token,
            _ => return Err(PdfSumError::MissingCredential),
        },
    };

    let client = HfSummaryClient::configured(
        credential,
        config.model.model_id(),
        config.api_base.clone(),
        config.retry.clone(),
        config.api_timeout_secs,
    )?;
    Ok(Arc::new(client))
}

/// Submit chunks one at a time, in order, recording per-chunk outcomes and
/// firing progress events.
///
/// Sequential by design: each request fully completes (including retries
/// and backoff) before the next begins, which preserves document order in
/// the result vector and keeps request pressure on the remote endpoint at
/// one in-flight call.
pub(crate) async fn summarize_chunks(
    chunks: &[String],
    summarizer: &dyn Summarizer,
    progress: Option<&ProgressCallback>,
) -> Vec<ChunkOutcome> {
    let total = chunks.len();
    if let Some(cb) = progress {
        cb.on_run_start(total);
    }

    let mut outcomes = Vec::with_capacity(total);
    let mut succeeded = 0usize;

    for (index, chunk_text) in chunks.iter().enumerate() {
        if let Some(cb) = progress {
            cb.on_chunk_start(index, total);
        }

        let start = Instant::now();
        let summary = summarizer.summarize_chunk(chunk_text).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match &summary {
            ChunkSummary::Summary(s) => {
                succeeded += 1;
                if let Some(cb) = progress {
                    cb.on_chunk_complete(index, total, s.len());
                }
            }
            ChunkSummary::NoSummary => {
                warn!("Chunk {}/{} produced no summary", index + 1, total);
                if let Some(cb) = progress {
                    cb.on_chunk_failed(index, total);
                }
            }
        }

        outcomes.push(ChunkOutcome {
            index,
            chars: chunk_text.chars().count(),
            summary,
            duration_ms,
        });
    }

    if let Some(cb) = progress {
        cb.on_run_complete(total, succeeded);
    }

    outcomes
}
