//! CLI binary for pdf2speech.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `BatchConfig`, creates the destination folders, and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2speech::{
    run_batch, BatchConfig, BatchProgressCallback, GoogleTranslateTts, PdfiumExtractor,
    ProgressCallback, TesseractOcr,
};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
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

/// Terminal progress callback: renders a live progress bar and per-document
/// log lines. Designed to work correctly when documents complete
/// out-of-order (parallel mode).
struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_batch_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Scanning");
        bar.set_message("Listing PDF files…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_documents: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} documents  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total_documents as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
        self.bar.reset_eta();
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Processing {total_documents} PDF documents…"))
        ));
    }

    fn on_document_start(&self, stem: &str) {
        self.bar.set_message(stem.to_string());
    }

    fn on_document_skipped(&self, stem: &str) {
        self.bar.println(format!(
            "  {} {}  {}",
            cyan("∅"),
            stem,
            dim("no text — skipped")
        ));
        self.bar.inc(1);
    }

    fn on_document_complete(&self, stem: &str, elapsed: Duration) {
        self.bar.println(format!(
            "  {} {}  {}",
            green("✓"),
            stem,
            dim(&format!("{:.1}s", elapsed.as_secs_f64())),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, stem: &str, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg: String = if error.chars().count() > 80 {
            let head: String = error.chars().take(79).collect();
            format!("{head}\u{2026}")
        } else {
            error.to_string()
        };

        self.bar
            .println(format!("  {} {}  {}", red("✗"), stem, red(&msg)));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, processed: usize, skipped: usize, failed: usize) {
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} documents converted, {} skipped",
                green("✔"),
                bold(&processed.to_string()),
                skipped
            );
        } else {
            eprintln!(
                "{} {} converted, {} skipped  ({} failed)",
                if processed == 0 { red("✘") } else { cyan("⚠") },
                bold(&processed.to_string()),
                skipped,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert every PDF in a folder (text → ./output, audio → ./audio)
  pdf2speech ~/Documents/papers

  # Custom destinations and French synthesis
  pdf2speech scans --output-folder text --audio-folder mp3 --language fr

  # Parallel mode, one worker per CPU core
  pdf2speech scans --parallel

  # Patient retry schedule for a throttling service
  pdf2speech scans --retry-delay 10 --max-retries 8 --max-backoff 600

  # Machine-readable run summary
  pdf2speech scans --json > stats.json

CACHING:
  Audio files are cached by name: an existing <audio_folder>/<stem>.mp3
  short-circuits synthesis for that document, so re-running a batch only
  synthesizes what is missing. Delete the .mp3 to force re-synthesis.

REQUIREMENTS:
  pdfium     shared library on the loader path (PDF parsing and rendering)
  tesseract  on PATH, with the `eng` language pack (OCR fallback for
             scanned pages)

ENVIRONMENT VARIABLES:
  PDF2SPEECH_OUTPUT_FOLDER   Default --output-folder
  PDF2SPEECH_AUDIO_FOLDER    Default --audio-folder
  PDF2SPEECH_LANGUAGE        Default --language
  RUST_LOG                   Tracing filter (overrides -v/-q)
"#;

/// Convert a folder of PDF documents to spoken audio.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2speech",
    version,
    about = "Convert a folder of PDF documents to spoken audio",
    long_about = "Extract text from every PDF in a folder (with OCR fallback for scanned \
pages), save it as plain text, and synthesize MP3 audio via a remote text-to-speech \
service with caching and rate-limit-aware retries.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Folder containing the PDF files to convert.
    input_folder: PathBuf,

    /// Folder for the extracted text files.
    #[arg(long, env = "PDF2SPEECH_OUTPUT_FOLDER", default_value = "output")]
    output_folder: PathBuf,

    /// Folder for the audio files (also the synthesis cache).
    #[arg(long, env = "PDF2SPEECH_AUDIO_FOLDER", default_value = "audio")]
    audio_folder: PathBuf,

    /// Language code for text-to-speech conversion.
    #[arg(short, long, env = "PDF2SPEECH_LANGUAGE", default_value = "en")]
    language: String,

    /// Process files in parallel (worker pool sized to CPU count).
    #[arg(short, long)]
    parallel: bool,

    /// Worker-pool size in parallel mode (default: CPU count).
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Initial delay in seconds before retrying a rate-limited synthesis.
    #[arg(long, default_value_t = 5)]
    retry_delay: u64,

    /// Maximum synthesis attempts per document.
    #[arg(long, default_value_t = 10)]
    max_retries: u32,

    /// Ceiling in seconds on the doubling retry delay.
    #[arg(long, default_value_t = 300)]
    max_backoff: u64,

    /// Print the run summary as JSON instead of human-readable text.
    #[arg(long)]
    json: bool,

    /// Disable the progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
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

    // ── Destination folders ──────────────────────────────────────────────
    std::fs::create_dir_all(&cli.output_folder)
        .with_context(|| format!("Failed to create output folder {:?}", cli.output_folder))?;
    std::fs::create_dir_all(&cli.audio_folder)
        .with_context(|| format!("Failed to create audio folder {:?}", cli.audio_folder))?;

    // ── Build config ─────────────────────────────────────────────────────
    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };

    let mut builder = BatchConfig::builder()
        .output_dir(cli.output_folder.clone())
        .audio_dir(cli.audio_folder.clone())
        .language(cli.language.clone())
        .parallel(cli.parallel)
        .retry_delay(Duration::from_secs(cli.retry_delay))
        .max_retries(cli.max_retries)
        .max_backoff(Duration::from_secs(cli.max_backoff));

    if let Some(jobs) = cli.jobs {
        builder = builder.concurrency(jobs);
    }
    if let Some(cb) = progress {
        builder = builder.progress(cb);
    }

    let config = builder.build().context("Invalid configuration")?;

    // ── Run the batch ────────────────────────────────────────────────────
    let extractor = PdfiumExtractor::new(Arc::new(TesseractOcr::new()));
    let provider = GoogleTranslateTts::new();

    let stats = run_batch(&cli.input_folder, &extractor, &provider, &config)
        .await
        .context("Batch conversion failed")?;

    // ── Summary ──────────────────────────────────────────────────────────
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&stats).context("Failed to serialise stats")?
        );
    } else if !cli.quiet && !show_progress {
        // Only print inline stats when the progress callback is disabled
        // (the callback already printed the final tick).
        eprintln!(
            "Converted {}/{} documents ({} skipped) in {}ms",
            stats.processed, stats.total_documents, stats.skipped, stats.total_duration_ms
        );
    } else if !cli.quiet {
        eprintln!(
            "   {}  →  {}",
            dim(&format!("{}ms total", stats.total_duration_ms)),
            bold(&cli.audio_folder.display().to_string()),
        );
    }

    Ok(())
}
