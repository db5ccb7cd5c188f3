//! CLI binary for pdfsum.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `AnalysisConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdfsum::{
    analyze, AnalysisConfig, AnalysisProgressCallback, ProgressCallback, SummaryModel,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar across the chunk sequence plus a
/// per-chunk log line. Chunks are processed sequentially, so events arrive
/// in order; the timing map still keys by index for robustness.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<std::collections::HashMap<usize, Instant>>,
    failures: AtomicUsize,
}

impl CliProgressCallback {
    /// Create a callback whose bar length is set by `on_run_start`
    /// (called once the text has been chunked).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Reading");
        bar.set_message("Extracting text…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(std::collections::HashMap::new()),
            failures: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} chunks  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Summarizing");
        self.bar.reset_eta();
    }

    fn elapsed_secs(&self, index: usize) -> f64 {
        self.start_times
            .lock()
            .unwrap()
            .remove(&index)
            .map(|t| t.elapsed().as_millis() as f64 / 1000.0)
            .unwrap_or(0.0)
    }
}

impl AnalysisProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_chunks: usize) {
        self.activate_bar(total_chunks);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Summarizing {total_chunks} sections…"))
        ));
    }

    fn on_chunk_start(&self, index: usize, _total: usize) {
        self.start_times
            .lock()
            .unwrap()
            .insert(index, Instant::now());
        self.bar.set_message(format!("chunk {}", index + 1));
    }

    fn on_chunk_complete(&self, index: usize, total: usize, summary_len: usize) {
        let secs = self.elapsed_secs(index);
        self.bar.println(format!(
            "  {} Chunk {:>3}/{:<3}  {:<10}  {}",
            green("✓"),
            index + 1,
            total,
            dim(&format!("{summary_len:>4} chars")),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_chunk_failed(&self, index: usize, total: usize) {
        let secs = self.elapsed_secs(index);
        self.failures.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!(
            "  {} Chunk {:>3}/{:<3}  {}  {}",
            red("✗"),
            index + 1,
            total,
            red("no summary"),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, total_chunks: usize, success_count: usize) {
        let failed = total_chunks.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} sections summarized",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} sections summarized  ({} failed)",
                if failed == total_chunks {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_chunks,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Summarize to stdout (token from HF_TOKEN)
  pdfsum report.pdf

  # Summarize to a file, save images alongside
  pdfsum report.pdf -o summary.txt --images ./figures

  # Smaller chunks, distilled model
  pdfsum --model distilbart-cnn-12-6 --chunk-size 1000 paper.pdf

  # Summarize straight from a URL, text only
  pdfsum https://arxiv.org/pdf/1706.03762 --no-images

MODELS:
  facebook/bart-large-cnn        stronger summaries (default)
  sshleifer/distilbart-cnn-12-6  distilled, faster

ENVIRONMENT VARIABLES:
  HF_TOKEN         Hugging Face API token (required unless --token is given)
  PDFIUM_LIB_PATH  Path to an existing libpdfium shared library
"#;

/// Summarize PDF documents and extract their images.
#[derive(Parser, Debug)]
#[command(
    name = "pdfsum",
    version,
    about = "Summarize PDF documents and extract their images via Hugging Face inference",
    long_about = "Extract the text layer of a PDF (local file or URL), summarize it chunk by \
chunk through a hosted Hugging Face summarization model, and recover the document's \
content-bearing images. Failed chunks are skipped; whatever succeeds is joined into one \
summary in document order.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Write the summary to this file instead of stdout.
    #[arg(short, long, env = "PDFSUM_OUTPUT")]
    output: Option<PathBuf>,

    /// Hugging Face API token.
    #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Summarization model: bart-large-cnn or distilbart-cnn-12-6.
    #[arg(long, env = "PDFSUM_MODEL", default_value = "bart-large-cnn")]
    model: SummaryModel,

    /// Chunk size in characters (1000–4000).
    #[arg(long, env = "PDFSUM_CHUNK_SIZE", default_value_t = 2000,
          value_parser = clap::value_parser!(u64).range(1000..=4000))]
    chunk_size: u64,

    /// Directory to write extracted images into (PNG, one file per image).
    #[arg(long, env = "PDFSUM_IMAGES")]
    images: Option<PathBuf>,

    /// Skip the image-extraction phase entirely.
    #[arg(long, env = "PDFSUM_NO_IMAGES")]
    no_images: bool,

    /// Output structured JSON (summary, per-chunk outcomes, stats) instead of text.
    #[arg(long, env = "PDFSUM_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDFSUM_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFSUM_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFSUM_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds (URL inputs).
    #[arg(long, env = "PDFSUM_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Per-request inference timeout in seconds.
    #[arg(long, env = "PDFSUM_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn AnalysisProgressCallback>)
    } else {
        None
    };

    let mut builder = AnalysisConfig::builder()
        .model(cli.model)
        .chunk_size(cli.chunk_size as usize)
        .extract_images(!cli.no_images)
        .download_timeout_secs(cli.download_timeout)
        .api_timeout_secs(cli.api_timeout);

    if let Some(ref token) = cli.token {
        builder = builder.credential(token);
    }
    if let Some(cb) = progress_cb {
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run analysis ─────────────────────────────────────────────────────
    let result = analyze(&cli.input, &config).await.context("Analysis failed")?;

    for warning in &result.warnings {
        eprintln!("{} {}", cyan("⚠"), warning);
    }

    // ── Emit summary ─────────────────────────────────────────────────────
    if cli.json {
        let json = serde_json::json!({
            "summary": result.summary,
            "chunks": result.chunks,
            "warnings": result.warnings,
            "stats": result.stats,
            "images": result.images.iter().map(|img| serde_json::json!({
                "page": img.page,
                "index_on_page": img.index_on_page,
                "width": img.width(),
                "height": img.height(),
            })).collect::<Vec<_>>(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&json).context("Failed to serialise output")?
        );
    } else if let Some(ref output_path) = cli.output {
        tokio::fs::write(output_path, &result.summary)
            .await
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        if !cli.quiet {
            eprintln!(
                "{}  {}/{} chunks  {}ms  →  {}",
                if result.stats.failed_chunks == 0 {
                    green("✔")
                } else {
                    cyan("⚠")
                },
                result.stats.summarized_chunks,
                result.stats.total_chunks,
                result.stats.total_duration_ms,
                bold(&output_path.display().to_string()),
            );
        }
    } else if result.has_summary() {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(result.summary.as_bytes())
            .context("Failed to write to stdout")?;
        handle.write_all(b"\n").ok();
    } else if !cli.quiet {
        eprintln!("{}", dim("No summary produced."));
    }

    // ── Write images ─────────────────────────────────────────────────────
    if let Some(ref dir) = cli.images {
        if result.images.is_empty() {
            if !cli.quiet {
                eprintln!("{}", dim("No substantial images found in this document."));
            }
        } else {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            for img in &result.images {
                let mut buf = Vec::new();
                img.image
                    .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
                    .with_context(|| {
                        format!("Failed to encode page {} image {}", img.page, img.index_on_page)
                    })?;
                let path = dir.join(format!("page{:03}-img{:02}.png", img.page, img.index_on_page));
                std::fs::write(&path, buf)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
            if !cli.quiet {
                eprintln!(
                    "{} {} images → {}",
                    green("✔"),
                    result.images.len(),
                    bold(&dir.display().to_string())
                );
            }
        }
    }

    Ok(())
}
