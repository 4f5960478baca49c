//! Pipeline stages for PDF-to-speech conversion.
//!
//! Each submodule implements exactly one stage. Keeping stages separate
//! makes each independently testable and lets us swap implementations
//! (another OCR engine, another speech service) without touching the
//! others.
//!
//! ## Data Flow
//!
//! ```text
//! extract ───────▶ speech ──────▶ <stem>.mp3
//! (pdfium + ocr)   (cache, retry)
//! ```
//!
//! 1. [`extract`] — per-page native text via pdfium, OCR fallback for pages
//!    without a text layer; runs in `spawn_blocking` because pdfium is not
//!    async-safe
//! 2. [`ocr`]     — the [`ocr::OcrEngine`] seam and its tesseract-backed
//!    implementation
//! 3. [`tts`]     — the [`tts::SpeechProvider`] seam and its HTTP-backed
//!    implementation; the only stage with network I/O
//! 4. [`speech`]  — cache presence check, retry loop, and capped
//!    exponential backoff around the provider

pub mod extract;
pub mod ocr;
pub mod speech;
pub mod tts;

use std::path::{Path, PathBuf};

/// Write a file atomically: write to `<path>.tmp`, then rename into place.
///
/// Concurrent workers never share a stem, so the temp name cannot collide.
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, bytes).await?;
    tokio::fs::rename(&tmp_path, path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_atomic_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");

        write_atomic(&target, b"payload").await.unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"payload");
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("out.txt")]);
    }

    #[tokio::test]
    async fn write_atomic_replaces_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");

        write_atomic(&target, b"first").await.unwrap();
        write_atomic(&target, b"second").await.unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"second");
    }
}
