//! Summarization client: one chunk in, one [`ChunkSummary`] out.
//!
//! This module drives the Hugging Face inference router with retry/backoff;
//! it is the only pipeline stage with network I/O. All prompt parameters are
//! fixed constants of the endpoint contract, so the interesting surface here
//! is failure handling.
//!
//! ## Degrade, never fail
//!
//! [`Summarizer::summarize_chunk`] returns [`ChunkSummary`], not a `Result`.
//! Every failure mode — retry budget exhausted, non-retryable status,
//! malformed success body — collapses to [`ChunkSummary::NoSummary`], and
//! the orchestrator simply moves on to the next chunk. One dead chunk never
//! costs the caller the rest of the document.
//!
//! ## Retry Strategy
//!
//! The hosted models return 503 while loading and 429 under rate pressure;
//! both clear within seconds. The policy allows 5 attempts total, waiting
//! `(attempt + 1) * 5 s` after a 429/503 and a flat 2 s after a
//! network-level error. Each failure consumes one attempt. The policy is an
//! injectable value ([`RetryPolicy`]) so tests can drive the loop with a
//! paused clock.

use crate::config::SummaryModel;
use crate::error::PdfSumError;
use crate::output::ChunkSummary;
use async_trait::async_trait;
use futures::future::BoxFuture;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Default inference router endpoint.
pub const DEFAULT_API_BASE: &str = "https://router.huggingface.co/hf-inference";

/// Fixed decoding parameters sent with every request.
const MIN_SUMMARY_LENGTH: u32 = 30;
const MAX_SUMMARY_LENGTH: u32 = 150;

/// Anything that can turn a chunk of text into a summary.
///
/// The orchestrator depends on this trait rather than on the HTTP client
/// directly, so tests (and callers with their own inference plumbing) can
/// inject a substitute via
/// [`crate::config::AnalysisConfigBuilder::summarizer`].
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize one chunk. Must not fail: all failure modes collapse to
    /// [`ChunkSummary::NoSummary`].
    async fn summarize_chunk(&self, chunk: &str) -> ChunkSummary;
}

// ── Retry policy ─────────────────────────────────────────────────────────

/// Retry budget and backoff schedule for one chunk submission.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per chunk (first try included). Default: 5.
    pub max_attempts: u32,
    /// Base delay after a 429/503, scaled linearly by attempt number:
    /// the wait after attempt `n` (0-indexed) is `(n + 1) * rate_limit_step`.
    /// Default: 5 s.
    pub rate_limit_step: Duration,
    /// Flat delay after a network-level error. Default: 2 s.
    pub transport_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            rate_limit_step: Duration::from_secs(5),
            transport_backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Backoff after a rate-limit/loading response on the given attempt
    /// (0-indexed): 5 s, 10 s, 15 s, …
    pub fn rate_limit_backoff(&self, attempt: u32) -> Duration {
        self.rate_limit_step * (attempt + 1)
    }

    /// True for the two statuses worth waiting out: 429 (rate-limited) and
    /// 503 (model loading).
    pub fn is_retryable_status(status: u16) -> bool {
        matches!(status, 429 | 503)
    }
}

/// Result of a single request attempt, before retry classification.
#[derive(Debug)]
pub(crate) enum AttemptOutcome {
    /// Terminal: a parsed success body, or a permanent failure already
    /// collapsed to `NoSummary`. No further attempts.
    Done(ChunkSummary),
    /// HTTP 429/503 — wait out the linear backoff and try again.
    Busy { status: u16 },
    /// Network-level failure (connect, timeout, body read) — brief flat
    /// backoff and try again.
    Transport { detail: String },
}

/// Drive attempts against `attempt_fn` until a terminal outcome or the
/// budget runs out.
///
/// Backoff is skipped after the final attempt: there is nobody left to wait
/// for. Exhaustion yields `NoSummary`.
pub(crate) async fn run_with_retries<'a, F>(policy: &RetryPolicy, mut attempt_fn: F) -> ChunkSummary
where
    F: FnMut(u32) -> BoxFuture<'a, AttemptOutcome> + Send,
{
    for attempt in 0..policy.max_attempts {
        match attempt_fn(attempt).await {
            AttemptOutcome::Done(summary) => return summary,
            AttemptOutcome::Busy { status } => {
                if attempt + 1 < policy.max_attempts {
                    let backoff = policy.rate_limit_backoff(attempt);
                    warn!(
                        "HTTP {} on attempt {}/{}, retrying in {:?}",
                        status,
                        attempt + 1,
                        policy.max_attempts,
                        backoff
                    );
                    sleep(backoff).await;
                } else {
                    warn!("HTTP {} on final attempt, giving up", status);
                }
            }
            AttemptOutcome::Transport { detail } => {
                if attempt + 1 < policy.max_attempts {
                    warn!(
                        "Request failed on attempt {}/{} ({}), retrying in {:?}",
                        attempt + 1,
                        policy.max_attempts,
                        detail,
                        policy.transport_backoff
                    );
                    sleep(policy.transport_backoff).await;
                } else {
                    warn!("Request failed on final attempt: {}", detail);
                }
            }
        }
    }
    ChunkSummary::NoSummary
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct SummaryRequest<'a> {
    inputs: &'a str,
    parameters: SummaryParameters,
}

#[derive(Serialize)]
struct SummaryParameters {
    min_length: u32,
    max_length: u32,
    do_sample: bool,
}

impl Default for SummaryParameters {
    fn default() -> Self {
        Self {
            min_length: MIN_SUMMARY_LENGTH,
            max_length: MAX_SUMMARY_LENGTH,
            do_sample: false,
        }
    }
}

#[derive(Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    summary_text: Option<String>,
}

/// Parse a 200 body: a JSON array of result objects, first `summary_text`
/// wins. An empty array, a missing or empty field, or a body that is not
/// the expected shape all mean "no summary" — a malformed success is not
/// worth a retry.
pub(crate) fn parse_summary_body(body: &str) -> ChunkSummary {
    match serde_json::from_str::<Vec<SummaryResponse>>(body) {
        Ok(results) => results
            .into_iter()
            .next()
            .and_then(|r| r.summary_text)
            .filter(|s| !s.is_empty())
            .map(ChunkSummary::Summary)
            .unwrap_or(ChunkSummary::NoSummary),
        Err(e) => {
            debug!("Unparseable success body: {}", e);
            ChunkSummary::NoSummary
        }
    }
}

// ── HTTP client ──────────────────────────────────────────────────────────

/// [`Summarizer`] backed by the Hugging Face inference router.
pub struct HfSummaryClient {
    http: reqwest::Client,
    credential: String,
    model_id: String,
    api_base: String,
    policy: RetryPolicy,
}

impl HfSummaryClient {
    /// Client with the default endpoint, retry policy, and a 60 s
    /// per-request timeout.
    pub fn new(credential: impl Into<String>, model: SummaryModel) -> Result<Self, PdfSumError> {
        Self::configured(
            credential,
            model.model_id(),
            DEFAULT_API_BASE,
            RetryPolicy::default(),
            60,
        )
    }

    /// Fully specified client. `model_id` is a raw identifier so callers can
    /// point at models outside the built-in [`SummaryModel`] set.
    pub fn configured(
        credential: impl Into<String>,
        model_id: impl Into<String>,
        api_base: impl Into<String>,
        policy: RetryPolicy,
        timeout_secs: u64,
    ) -> Result<Self, PdfSumError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| PdfSumError::Internal(format!("HTTP client build failed: {e}")))?;

        Ok(Self {
            http,
            credential: credential.into(),
            model_id: model_id.into(),
            api_base: api_base.into(),
            policy,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}",
            self.api_base.trim_end_matches('/'),
            self.model_id
        )
    }

    /// One POST, classified for the retry driver.
    async fn request_once(&self, chunk: &str, attempt: u32) -> AttemptOutcome {
        let payload = SummaryRequest {
            inputs: chunk,
            parameters: SummaryParameters::default(),
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.credential)
            .json(&payload)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                return AttemptOutcome::Transport {
                    detail: e.to_string(),
                }
            }
        };

        let status = response.status();
        debug!(
            "model={} attempt={} status={}",
            self.model_id,
            attempt + 1,
            status
        );

        if status == StatusCode::OK {
            match response.text().await {
                Ok(body) => AttemptOutcome::Done(parse_summary_body(&body)),
                Err(e) => AttemptOutcome::Transport {
                    detail: format!("body read failed: {e}"),
                },
            }
        } else if RetryPolicy::is_retryable_status(status.as_u16()) {
            AttemptOutcome::Busy {
                status: status.as_u16(),
            }
        } else {
            warn!(
                "model={}: permanent failure, HTTP {}",
                self.model_id, status
            );
            AttemptOutcome::Done(ChunkSummary::NoSummary)
        }
    }
}

#[async_trait]
impl Summarizer for HfSummaryClient {
    async fn summarize_chunk(&self, chunk: &str) -> ChunkSummary {
        run_with_retries(&self.policy, |attempt| {
            Box::pin(self.request_once(chunk, attempt))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    // ── Body parsing ─────────────────────────────────────────────────────

    #[test]
    fn parse_valid_body_returns_first_summary() {
        let body = r#"[{"summary_text": "A concise summary."}, {"summary_text": "ignored"}]"#;
        assert_eq!(
            parse_summary_body(body),
            ChunkSummary::Summary("A concise summary.".into())
        );
    }

    #[test]
    fn parse_tolerates_extra_fields() {
        let body = r#"[{"summary_text": "ok", "score": 0.92}]"#;
        assert_eq!(parse_summary_body(body), ChunkSummary::Summary("ok".into()));
    }

    #[test]
    fn parse_empty_array_is_no_summary() {
        assert_eq!(parse_summary_body("[]"), ChunkSummary::NoSummary);
    }

    #[test]
    fn parse_missing_or_empty_field_is_no_summary() {
        assert_eq!(
            parse_summary_body(r#"[{"generated_text": "wrong task"}]"#),
            ChunkSummary::NoSummary
        );
        assert_eq!(
            parse_summary_body(r#"[{"summary_text": ""}]"#),
            ChunkSummary::NoSummary
        );
    }

    #[test]
    fn parse_malformed_body_is_no_summary() {
        assert_eq!(parse_summary_body("not json"), ChunkSummary::NoSummary);
        assert_eq!(
            parse_summary_body(r#"{"error": "model overloaded"}"#),
            ChunkSummary::NoSummary
        );
    }

    // ── Policy ───────────────────────────────────────────────────────────

    #[test]
    fn rate_limit_backoff_is_linear() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.rate_limit_backoff(0), Duration::from_secs(5));
        assert_eq!(policy.rate_limit_backoff(1), Duration::from_secs(10));
        assert_eq!(policy.rate_limit_backoff(4), Duration::from_secs(25));
    }

    #[test]
    fn retryable_statuses() {
        assert!(RetryPolicy::is_retryable_status(429));
        assert!(RetryPolicy::is_retryable_status(503));
        assert!(!RetryPolicy::is_retryable_status(200));
        assert!(!RetryPolicy::is_retryable_status(400));
        assert!(!RetryPolicy::is_retryable_status(401));
        assert!(!RetryPolicy::is_retryable_status(500));
    }

    // ── Retry driver (paused clock: sleeps complete instantly) ───────────

    type ScriptedFn = Box<dyn FnMut(u32) -> BoxFuture<'static, AttemptOutcome> + Send>;

    fn scripted(outcomes: Vec<AttemptOutcome>) -> (ScriptedFn, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let mut script = VecDeque::from(outcomes);
        let f: ScriptedFn = Box::new(move |_attempt: u32| {
            counter.fetch_add(1, Ordering::SeqCst);
            let outcome = script
                .pop_front()
                .expect("retry driver requested more attempts than scripted");
            let fut: BoxFuture<'static, AttemptOutcome> = Box::pin(async move { outcome });
            fut
        });
        (f, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn busy_twice_then_success_takes_three_attempts() {
        let (f, calls) = scripted(vec![
            AttemptOutcome::Busy { status: 503 },
            AttemptOutcome::Busy { status: 503 },
            AttemptOutcome::Done(ChunkSummary::Summary("done".into())),
        ]);
        let start = Instant::now();
        let result = run_with_retries(&RetryPolicy::default(), f).await;

        assert_eq!(result, ChunkSummary::Summary("done".into()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Two backoff waits: 5 s after attempt 0, 10 s after attempt 1.
        assert_eq!(start.elapsed(), Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn transport_error_waits_flat_two_seconds() {
        let (f, calls) = scripted(vec![
            AttemptOutcome::Transport {
                detail: "connection reset".into(),
            },
            AttemptOutcome::Done(ChunkSummary::Summary("ok".into())),
        ]);
        let start = Instant::now();
        let result = run_with_retries(&RetryPolicy::default(), f).await;

        assert_eq!(result, ChunkSummary::Summary("ok".into()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_failure_stops_immediately() {
        let (f, calls) = scripted(vec![AttemptOutcome::Done(ChunkSummary::NoSummary)]);
        let start = Instant::now();
        let result = run_with_retries(&RetryPolicy::default(), f).await;

        assert_eq!(result, ChunkSummary::NoSummary);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_budget_is_no_summary_without_terminal_sleep() {
        let (f, calls) = scripted(vec![
            AttemptOutcome::Busy { status: 429 },
            AttemptOutcome::Busy { status: 429 },
            AttemptOutcome::Busy { status: 429 },
            AttemptOutcome::Busy { status: 429 },
            AttemptOutcome::Busy { status: 429 },
        ]);
        let start = Instant::now();
        let result = run_with_retries(&RetryPolicy::default(), f).await;

        assert_eq!(result, ChunkSummary::NoSummary);
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        // 5 + 10 + 15 + 20; no sleep after the final attempt.
        assert_eq!(start.elapsed(), Duration::from_secs(50));
    }

    // ── Client plumbing ──────────────────────────────────────────────────

    #[test]
    fn endpoint_joins_base_and_model() {
        let client = HfSummaryClient::new("tok", SummaryModel::BartLargeCnn).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://router.huggingface.co/hf-inference/models/facebook/bart-large-cnn"
        );
    }

    #[test]
    fn endpoint_tolerates_trailing_slash_in_base() {
        let client = HfSummaryClient::configured(
            "tok",
            "sshleifer/distilbart-cnn-12-6",
            "http://localhost:8080/",
            RetryPolicy::default(),
            10,
        )
        .unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:8080/models/sshleifer/distilbart-cnn-12-6"
        );
    }

    #[test]
    fn request_payload_shape() {
        let payload = SummaryRequest {
            inputs: "some text",
            parameters: SummaryParameters::default(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["inputs"], "some text");
        assert_eq!(json["parameters"]["min_length"], 30);
        assert_eq!(json["parameters"]["max_length"], 150);
        assert_eq!(json["parameters"]["do_sample"], false);
    }
}
