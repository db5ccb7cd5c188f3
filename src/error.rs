//! Error types for the pdfsum library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PdfSumError`] — **Fatal**: the run cannot proceed at all (bad input,
//!   missing credential, invalid configuration). Returned as
//!   `Err(PdfSumError)` from the top-level `analyze*` functions.
//!
//! * [`AnalysisWarning`] — **Non-fatal**: one phase degraded (text layer
//!   unreadable, one embedded image corrupt) but the rest of the run is
//!   fine. Collected in [`crate::output::AnalysisOutput::warnings`] so
//!   callers can inspect partial success rather than losing the whole
//!   document to one bad stream.
//!
//! Per-chunk summarization failures are not errors at all: they collapse to
//! [`crate::output::ChunkSummary::NoSummary`] inside the result set, and the
//! aggregate summary is built from whatever succeeded.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdfsum library.
///
/// Degraded-phase outcomes use [`AnalysisWarning`] and are stored in
/// [`crate::output::AnalysisOutput`] rather than propagated here.
#[derive(Debug, Error)]
pub enum PdfSumError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{}'\nCheck the path exists and is readable.", path.display())]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{}'\nTry: chmod +r '{}'", path.display(), path.display())]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The input was read, but it is not a PDF.
    #[error("Input is not a valid PDF ('{source_name}')\nFirst bytes: {magic:?}")]
    NotAPdf {
        source_name: String,
        magic: [u8; 4],
    },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The PDF text layer could not be read (corrupt xref, encryption, …).
    ///
    /// Fatal when returned from [`crate::pipeline::extract::extract_text`]
    /// directly; the orchestrator downgrades it to
    /// [`AnalysisWarning::TextExtraction`] and still attempts the image
    /// phase, since the two extraction paths are independent.
    #[error("Failed to read PDF text: {detail}")]
    ReadError { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// No API credential was supplied and `HF_TOKEN` is not set.
    #[error(
        "No Hugging Face API token configured.\n\
         Set HF_TOKEN in the environment or pass --token <TOKEN>."
    )]
    MissingCredential,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{}': {source}", path.display())]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal, per-phase degradation notice.
///
/// Stored in [`crate::output::AnalysisOutput::warnings`]. The run continues
/// past every one of these.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum AnalysisWarning {
    /// The text layer could not be read; summarization was skipped.
    #[error("Text extraction failed: {detail}")]
    TextExtraction { detail: String },

    /// The document could not be opened for image enumeration.
    #[error("Image extraction failed: {detail}")]
    ImageExtraction { detail: String },

    /// One embedded image failed to decode and was omitted.
    #[error("Page {page}: embedded image {index} could not be decoded: {detail}")]
    ImageDecode {
        page: usize,
        index: usize,
        detail: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_display_mentions_env_var() {
        let msg = PdfSumError::MissingCredential.to_string();
        assert!(msg.contains("HF_TOKEN"), "got: {msg}");
    }

    #[test]
    fn not_a_pdf_display() {
        let e = PdfSumError::NotAPdf {
            source_name: "report.docx".into(),
            magic: *b"PK\x03\x04",
        };
        assert!(e.to_string().contains("report.docx"));
    }

    #[test]
    fn read_error_display() {
        let e = PdfSumError::ReadError {
            detail: "corrupt xref table".into(),
        };
        assert!(e.to_string().contains("corrupt xref table"));
    }

    #[test]
    fn image_decode_warning_display() {
        let w = AnalysisWarning::ImageDecode {
            page: 4,
            index: 2,
            detail: "truncated stream".into(),
        };
        let msg = w.to_string();
        assert!(msg.contains("Page 4"));
        assert!(msg.contains("truncated stream"));
    }

    #[test]
    fn warnings_round_trip_as_json() {
        let w = AnalysisWarning::TextExtraction {
            detail: "bad trailer".into(),
        };
        let json = serde_json::to_string(&w).unwrap();
        let back: AnalysisWarning = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, AnalysisWarning::TextExtraction { .. }));
    }
}
