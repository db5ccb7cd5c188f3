//! Output types for a PDF analysis run.

use crate::error::AnalysisWarning;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Outcome of summarizing a single chunk.
///
/// An explicit two-variant enum rather than `Option<String>` so the
/// "no summary produced" case is a first-class, type-checked value and a
/// [`Summary`](ChunkSummary::Summary) is guaranteed non-empty by
/// construction (the client maps empty API responses to `NoSummary`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChunkSummary {
    /// The model produced a non-empty summary for this chunk.
    Summary(String),
    /// Permanent failure: retry budget exhausted, non-retryable status, or
    /// an empty/malformed success body. The run continues without it.
    NoSummary,
}

impl ChunkSummary {
    /// The summary text, if one was produced.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ChunkSummary::Summary(s) => Some(s),
            ChunkSummary::NoSummary => None,
        }
    }

    /// True when a summary was produced.
    pub fn is_summary(&self) -> bool {
        matches!(self, ChunkSummary::Summary(_))
    }
}

/// Per-chunk result, in document order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkOutcome {
    /// 0-indexed position of the chunk in the document.
    pub index: usize,
    /// Character count of the submitted chunk text.
    pub chars: usize,
    /// Summary or permanent-failure marker.
    pub summary: ChunkSummary,
    /// Wall-clock time spent on this chunk, retries and backoff included.
    pub duration_ms: u64,
}

/// An embedded raster image recovered from the document.
///
/// Only content-bearing images survive extraction: anything 100 px or
/// smaller on either axis (icons, bullets, decorative glyphs) is dropped.
#[derive(Debug, Clone)]
pub struct ExtractedImage {
    /// 1-indexed page the image was found on.
    pub page: usize,
    /// 0-indexed discovery order within the page.
    pub index_on_page: usize,
    /// Decoded pixel data.
    pub image: DynamicImage,
}

impl ExtractedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Aggregate counters and timings for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisStats {
    /// Characters of text recovered from the document.
    pub extracted_chars: usize,
    /// Chunks submitted for summarization.
    pub total_chunks: usize,
    /// Chunks that produced a summary.
    pub summarized_chunks: usize,
    /// Chunks that exhausted all attempts or hit a permanent failure.
    pub failed_chunks: usize,
    /// Content-bearing images recovered.
    pub image_count: usize,
    /// Time spent reading the text layer.
    pub text_duration_ms: u64,
    /// Time spent in the summarization loop (network, retries, backoff).
    pub summarize_duration_ms: u64,
    /// Time spent enumerating and decoding embedded images.
    pub image_duration_ms: u64,
    /// End-to-end wall-clock time.
    pub total_duration_ms: u64,
}

/// Everything produced by one analysis run.
#[derive(Debug)]
pub struct AnalysisOutput {
    /// Space-joined concatenation of successful chunk summaries, in
    /// document order. Empty when the document had no text or every chunk
    /// failed — that is "no summary produced", not an error.
    pub summary: String,
    /// Per-chunk outcomes, ordered by chunk index.
    pub chunks: Vec<ChunkOutcome>,
    /// Content-bearing images, in page order then in-page discovery order.
    pub images: Vec<ExtractedImage>,
    /// Non-fatal degradations encountered along the way.
    pub warnings: Vec<AnalysisWarning>,
    /// Counters and timings.
    pub stats: AnalysisStats,
}

impl AnalysisOutput {
    /// True when at least one chunk produced a summary.
    pub fn has_summary(&self) -> bool {
        !self.summary.is_empty()
    }
}

/// Join successful chunk summaries with a single space, in chunk order.
///
/// Failed chunks are skipped; all-failed (or no chunks) yields `""`.
pub(crate) fn aggregate_summary(chunks: &[ChunkOutcome]) -> String {
    chunks
        .iter()
        .filter_map(|c| c.summary.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(index: usize, summary: ChunkSummary) -> ChunkOutcome {
        ChunkOutcome {
            index,
            chars: 100,
            summary,
            duration_ms: 0,
        }
    }

    #[test]
    fn aggregate_joins_in_order_with_spaces() {
        let chunks = vec![
            outcome(0, ChunkSummary::Summary("First part.".into())),
            outcome(1, ChunkSummary::Summary("Second part.".into())),
            outcome(2, ChunkSummary::Summary("Third part.".into())),
        ];
        assert_eq!(
            aggregate_summary(&chunks),
            "First part. Second part. Third part."
        );
    }

    #[test]
    fn aggregate_skips_failed_chunks() {
        let chunks = vec![
            outcome(0, ChunkSummary::Summary("Kept.".into())),
            outcome(1, ChunkSummary::NoSummary),
            outcome(2, ChunkSummary::Summary("Also kept.".into())),
        ];
        assert_eq!(aggregate_summary(&chunks), "Kept. Also kept.");
    }

    #[test]
    fn aggregate_of_all_failures_is_empty() {
        let chunks = vec![
            outcome(0, ChunkSummary::NoSummary),
            outcome(1, ChunkSummary::NoSummary),
        ];
        assert_eq!(aggregate_summary(&chunks), "");
        assert!(aggregate_summary(&[]).is_empty());
    }

    #[test]
    fn chunk_summary_accessors() {
        let s = ChunkSummary::Summary("abc".into());
        assert!(s.is_summary());
        assert_eq!(s.as_str(), Some("abc"));
        assert!(!ChunkSummary::NoSummary.is_summary());
        assert_eq!(ChunkSummary::NoSummary.as_str(), None);
    }
}
