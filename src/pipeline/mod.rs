//! Pipeline stages for PDF summarization and image extraction.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap
//! implementations (e.g. switch the extraction backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ chunk ──▶ summarize ──▶ aggregate
//! (URL/path) (pdfium)  (windows)  (HF router)   (space-join)
//!               │
//!               └────▶ images ──▶ encode
//!                     (filtered)  (base64 PNG)
//! ```
//!
//! 1. [`input`]     — canonicalise the user-supplied path or URL to PDF bytes
//! 2. [`extract`]   — text layer and embedded images; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 3. [`chunk`]     — positional fixed-width text windows for the
//!    size-limited API
//! 4. [`summarize`] — drive the inference call with retry/backoff; the only
//!    stage with network I/O
//! 5. [`encode`]    — base64-PNG-wrap extracted images for display

pub mod chunk;
pub mod encode;
pub mod extract;
pub mod input;
pub mod summarize;
