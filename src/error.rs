//! Error types for the pdf2speech library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Pdf2SpeechError`] — the library error: a document (or the whole
//!   batch) cannot be processed. Returned from [`crate::batch::run_batch`],
//!   [`crate::document::process_document`], and the pipeline stages.
//!
//! * [`TtsError`] — a single call to the remote speech-synthesis service
//!   failed. The [`TtsError::RateLimited`] class is the only recoverable
//!   one: the synthesis retry loop backs off and tries again; every other
//!   class propagates immediately as [`Pdf2SpeechError::Synthesis`].
//!
//! The separation lets the retry loop match on the service error class
//! without pattern-matching display strings.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf2speech library.
#[derive(Debug, Error)]
pub enum Pdf2SpeechError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The input folder was not found or is not a directory.
    #[error("Input folder not found: '{path}'\nCheck the path exists and is a directory.")]
    InputDirNotFound { path: PathBuf },

    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// pdfium returned an error while reading a page's text layer.
    #[error("Text extraction failed for page {page}: {detail}")]
    PageTextFailed { page: usize, detail: String },

    /// pdfium returned an error while rasterising a page for OCR.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// The OCR engine failed on a rendered page image.
    #[error("OCR failed for page {page}: {detail}")]
    OcrFailed { page: usize, detail: String },

    // ── Synthesis errors ──────────────────────────────────────────────────
    /// The speech service returned a non-retryable error.
    #[error("Speech synthesis failed: {0}")]
    Synthesis(#[from] TtsError),

    /// Every attempt was rate-limited; the retry budget is spent.
    ///
    /// Deliberately distinct from the underlying [`TtsError`] so callers
    /// can tell "the service kept throttling us" apart from a single
    /// service failure.
    #[error("Failed to convert text to speech after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the extracted-text file.
    #[error("Failed to write text file '{path}': {source}")]
    TextWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write the audio file.
    #[error("Failed to write audio file '{path}': {source}")]
    AudioWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Batch errors ──────────────────────────────────────────────────────
    /// At least one document failed in parallel mode.
    ///
    /// Returned only after every dispatched document ran to completion, so
    /// artifacts for the successful siblings are already on disk.
    #[error("{failed}/{total} documents failed.\nFirst error: {first_error}")]
    BatchFailed {
        failed: usize,
        total: usize,
        first_error: String,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A single failed call to the remote speech-synthesis service.
#[derive(Debug, Error)]
pub enum TtsError {
    /// Service returned HTTP 429 — the caller should back off and retry.
    ///
    /// Check `retry_after_secs` for a server-specified delay, or use
    /// exponential backoff if `None`.
    #[error("Speech service rate limited the request (HTTP 429 Too Many Requests)")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Service returned a non-429 error status.
    #[error("Speech service returned HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    /// The request never completed (connection refused, DNS, timeout).
    #[error("Speech service unreachable: {detail}")]
    Network { detail: String },

    /// The service answered 200 but sent no audio bytes back.
    #[error("Speech service returned an empty audio stream")]
    EmptyAudio,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_failed_display() {
        let e = Pdf2SpeechError::BatchFailed {
            failed: 1,
            total: 10,
            first_error: "boom".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("1/10"), "got: {msg}");
        assert!(msg.contains("boom"));
    }

    #[test]
    fn retries_exhausted_display() {
        let e = Pdf2SpeechError::RetriesExhausted { attempts: 10 };
        assert!(e.to_string().contains("10 attempts"));
    }

    #[test]
    fn rate_limited_display() {
        let e = TtsError::RateLimited {
            retry_after_secs: Some(30),
        };
        assert!(e.to_string().contains("429"));
    }

    #[test]
    fn http_error_display() {
        let e = TtsError::Http {
            status: 503,
            detail: "service unavailable".into(),
        };
        assert!(e.to_string().contains("503"));
        assert!(e.to_string().contains("service unavailable"));
    }

    #[test]
    fn tts_error_converts_to_synthesis() {
        let e: Pdf2SpeechError = TtsError::EmptyAudio.into();
        assert!(matches!(e, Pdf2SpeechError::Synthesis(TtsError::EmptyAudio)));
    }

    #[test]
    fn ocr_failed_display_names_page() {
        let e = Pdf2SpeechError::OcrFailed {
            page: 3,
            detail: "tesseract exited with status 1".into(),
        };
        assert!(e.to_string().contains("page 3"));
    }
}
