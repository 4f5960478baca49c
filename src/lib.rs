//! # pdf2speech
//!
//! Convert folders of PDF documents into spoken-audio files.
//!
//! ## Why this crate?
//!
//! Scanned and digital PDF collections make poor listening material: the
//! text layer is often missing, public text-to-speech endpoints throttle
//! aggressively, and re-synthesizing a 300-page document because a batch
//! died halfway is expensive. This crate extracts text page by page
//! (falling back to OCR for pages without a text layer), persists the
//! text, and synthesizes audio through a cached, retry-aware speech stage
//! — so re-running a batch only pays for what is missing.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input folder
//!  │
//!  ├─ 1. Discover  list *.pdf files (non-recursive)
//!  ├─ 2. Extract   per-page text via pdfium; OCR fallback (CPU-bound, spawn_blocking)
//!  ├─ 3. Persist   <output>/<stem>.txt
//!  ├─ 4. Speak     cached TTS with capped exponential backoff on HTTP 429
//!  └─ 5. Output    <audio>/<stem>.mp3 + batch stats
//! ```
//!
//! Documents with no extractable text are skipped — no text file, no audio
//! file, no service call. The audio folder doubles as the synthesis cache:
//! a `<stem>.mp3` already present wins before any network traffic.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2speech::{run_batch, BatchConfig, GoogleTranslateTts, PdfiumExtractor, TesseractOcr};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BatchConfig::builder()
//!         .output_dir("output")
//!         .audio_dir("audio")
//!         .parallel(true)
//!         .build()?;
//!
//!     let extractor = PdfiumExtractor::new(Arc::new(TesseractOcr::new()));
//!     let provider = GoogleTranslateTts::new();
//!
//!     let stats = run_batch(Path::new("pdfs"), &extractor, &provider, &config).await?;
//!     println!("{} processed, {} skipped", stats.processed, stats.skipped);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2speech` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only
//! deps:
//! ```toml
//! pdf2speech = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod cache;
pub mod config;
pub mod document;
pub mod error;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{discover_documents, run_batch, BatchStats};
pub use cache::CacheKey;
pub use config::{BatchConfig, BatchConfigBuilder};
pub use document::{process_document, Document, DocumentOutcome};
pub use error::{Pdf2SpeechError, TtsError};
pub use pipeline::extract::{PdfiumExtractor, TextExtractor};
pub use pipeline::ocr::{OcrEngine, TesseractOcr};
pub use pipeline::speech::synthesize_to_file;
pub use pipeline::tts::{GoogleTranslateTts, SpeechProvider};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
