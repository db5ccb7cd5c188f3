//! Configuration types for a PDF analysis run.
//!
//! All run behaviour is controlled through [`AnalysisConfig`], built via its
//! [`AnalysisConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across threads and to diff two runs to
//! understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A ten-field constructor is unreadable and breaks on every new field. The
//! builder lets callers set only what they care about and rely on documented
//! defaults for the rest.

use crate::error::PdfSumError;
use crate::pipeline::summarize::{RetryPolicy, Summarizer, DEFAULT_API_BASE};
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Smallest accepted chunk width, in characters.
pub const MIN_CHUNK_SIZE: usize = 1000;
/// Largest accepted chunk width, in characters.
pub const MAX_CHUNK_SIZE: usize = 4000;
/// Default chunk width, in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 2000;

/// Configuration for one analysis run.
///
/// Built via [`AnalysisConfig::builder()`] or [`AnalysisConfig::default()`].
///
/// # Example
/// ```rust
/// use pdfsum::{AnalysisConfig, SummaryModel};
///
/// let config = AnalysisConfig::builder()
///     .credential("hf_…")
///     .model(SummaryModel::DistilbartCnn)
///     .chunk_size(1500)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct AnalysisConfig {
    /// Hugging Face API token. If `None`, the `HF_TOKEN` environment
    /// variable is consulted at run start; if that is also unset the run
    /// refuses to start ([`PdfSumError::MissingCredential`]) before any
    /// extraction or network work.
    pub credential: Option<String>,

    /// Which hosted summarization model to call. Default:
    /// [`SummaryModel::BartLargeCnn`].
    pub model: SummaryModel,

    /// Chunk width in characters. Range: 1000–4000. Default: 2000.
    ///
    /// The hosted models truncate long inputs, so text is submitted in
    /// windows of this many characters. Smaller chunks give the model more
    /// room per sentence but multiply request count (and rate-limit
    /// pressure); 2000 balances the two for typical documents.
    pub chunk_size: usize,

    /// Inference router base URL. Default:
    /// [`DEFAULT_API_BASE`](crate::pipeline::summarize::DEFAULT_API_BASE).
    /// Point this at a local stand-in for integration testing.
    pub api_base: String,

    /// Per-request timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Retry budget and backoff schedule for each chunk. Default: 5
    /// attempts, 5 s linear backoff on 429/503, 2 s flat on network errors.
    pub retry: RetryPolicy,

    /// Whether to run the image-extraction phase. Default: true.
    pub extract_images: bool,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Pre-constructed summarizer. Takes precedence over the HTTP client;
    /// when set, no credential is required. This is the test seam — inject
    /// a mock here to exercise the pipeline without the network.
    pub summarizer: Option<Arc<dyn Summarizer>>,

    /// Progress callback fired as chunks complete.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            credential: None,
            model: SummaryModel::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            api_base: DEFAULT_API_BASE.to_string(),
            api_timeout_secs: 60,
            retry: RetryPolicy::default(),
            extract_images: true,
            download_timeout_secs: 120,
            summarizer: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("chunk_size", &self.chunk_size)
            .field("api_base", &self.api_base)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("retry", &self.retry)
            .field("extract_images", &self.extract_images)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("summarizer", &self.summarizer.as_ref().map(|_| "<dyn Summarizer>"))
            .finish()
    }
}

impl AnalysisConfig {
    /// Create a new builder for `AnalysisConfig`.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AnalysisConfig`].
#[derive(Debug)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    pub fn credential(mut self, token: impl Into<String>) -> Self {
        self.config.credential = Some(token.into());
        self
    }

    pub fn model(mut self, model: SummaryModel) -> Self {
        self.config.model = model;
        self
    }

    /// Clamped to [`MIN_CHUNK_SIZE`]..=[`MAX_CHUNK_SIZE`].
    pub fn chunk_size(mut self, chars: usize) -> Self {
        self.config.chunk_size = chars.clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE);
        self
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.config.api_base = base.into();
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.config.retry = policy;
        self
    }

    pub fn extract_images(mut self, v: bool) -> Self {
        self.config.extract_images = v;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.config.summarizer = Some(summarizer);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalysisConfig, PdfSumError> {
        let c = &self.config;
        if c.chunk_size < MIN_CHUNK_SIZE || c.chunk_size > MAX_CHUNK_SIZE {
            return Err(PdfSumError::InvalidConfig(format!(
                "chunk size must be {MIN_CHUNK_SIZE}–{MAX_CHUNK_SIZE}, got {}",
                c.chunk_size
            )));
        }
        if c.retry.max_attempts == 0 {
            return Err(PdfSumError::InvalidConfig(
                "retry budget must be ≥ 1 attempt".into(),
            ));
        }
        if c.api_base.is_empty() {
            return Err(PdfSumError::InvalidConfig("api_base must not be empty".into()));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// The hosted summarization models known to work with the fixed request
/// parameters (min 30 / max 150 tokens, deterministic decoding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SummaryModel {
    /// `facebook/bart-large-cnn` — the stronger default.
    #[default]
    BartLargeCnn,
    /// `sshleifer/distilbart-cnn-12-6` — distilled, faster, slightly
    /// weaker summaries.
    DistilbartCnn,
}

impl SummaryModel {
    /// All selectable models, for help text and validation.
    pub const ALL: [SummaryModel; 2] = [SummaryModel::BartLargeCnn, SummaryModel::DistilbartCnn];

    /// The hub identifier used in the request path.
    pub fn model_id(&self) -> &'static str {
        match self {
            SummaryModel::BartLargeCnn => "facebook/bart-large-cnn",
            SummaryModel::DistilbartCnn => "sshleifer/distilbart-cnn-12-6",
        }
    }
}

impl fmt::Display for SummaryModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.model_id())
    }
}

impl FromStr for SummaryModel {
    type Err = String;

    /// Accepts the full hub id or the short tail after the org prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "facebook/bart-large-cnn" | "bart-large-cnn" => Ok(SummaryModel::BartLargeCnn),
            "sshleifer/distilbart-cnn-12-6" | "distilbart-cnn-12-6" => {
                Ok(SummaryModel::DistilbartCnn)
            }
            other => Err(format!(
                "unknown model '{other}' (expected one of: {})",
                SummaryModel::ALL
                    .iter()
                    .map(|m| m.model_id())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}
