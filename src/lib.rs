//! # pdfsum
//!
//! Summarize PDF documents and extract their embedded images using hosted
//! Hugging Face summarization models.
//!
//! ## Why this crate?
//!
//! Hosted summarization models accept a few thousand characters at a time,
//! and the free-tier endpoints drop in and out with 429s and 503s. This
//! crate handles the unglamorous middle: it reads the PDF text layer,
//! windows it into bounded chunks, drives each chunk through the inference
//! API with linear backoff, and reassembles whatever succeeded into one
//! document-order summary. Partial success always beats total failure — a
//! run with some dead chunks still returns the concatenation of the rest.
//! Content-bearing images (anything over 100 px on both axes) are recovered
//! in a second, independent pass over the same bytes.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input      resolve local file or download from URL into memory
//!  ├─ 2. Extract    text layer via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. Chunk      positional windows of ≤ chunk_size characters
//!  ├─ 4. Summarize  sequential calls with retry/backoff (429/503 aware)
//!  ├─ 5. Aggregate  space-join successful summaries, document order
//!  └─ 6. Images     second pass: size-filtered embedded rasters
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfsum::{analyze, AnalysisConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credential read from HF_TOKEN if not set on the config
//!     let config = AnalysisConfig::default();
//!     let output = analyze("document.pdf", &config).await?;
//!     println!("{}", output.summary);
//!     eprintln!(
//!         "chunks: {}/{} summarized, {} images",
//!         output.stats.summarized_chunks,
//!         output.stats.total_chunks,
//!         output.stats.image_count
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfsum` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only
//! deps:
//! ```toml
//! pdfsum = { version = "0.3", default-features = false }
//! ```
//!
//! ## Choosing a Model
//!
//! | Model | Speed | Quality |
//! |-------|-------|---------|
//! | `facebook/bart-large-cnn` (default) | moderate | ★★★★ |
//! | `sshleifer/distilbart-cnn-12-6` | fast | ★★★ |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{analyze, analyze_bytes, analyze_sync, analyze_to_file};
pub use config::{
    AnalysisConfig, AnalysisConfigBuilder, SummaryModel, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE,
    MIN_CHUNK_SIZE,
};
pub use error::{AnalysisWarning, PdfSumError};
pub use output::{AnalysisOutput, AnalysisStats, ChunkOutcome, ChunkSummary, ExtractedImage};
pub use pipeline::chunk::chunk_text;
pub use pipeline::encode::{encode_image, EncodedImage};
pub use pipeline::extract::{extract_images, extract_text, MIN_CONTENT_DIMENSION};
pub use pipeline::summarize::{
    HfSummaryClient, RetryPolicy, Summarizer, DEFAULT_API_BASE,
};
pub use progress::{AnalysisProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{analyze_stream, ChunkOutcomeStream};
