//! Optical character recognition for pages without a text layer.
//!
//! The engine is consumed behind the [`OcrEngine`] trait so the extractor
//! and the tests never depend on a specific backend. The production
//! implementation shells out to the `tesseract` binary: the rendered page
//! is written to a temporary PNG, tesseract writes its transcription next
//! to it, and both files vanish with the [`tempfile::TempDir`].
//!
//! Recognition always runs with the English language model — the OCR
//! language is independent of the speech-synthesis language code.

use image::RgbImage;
use std::process::Command;
use tracing::debug;

/// Result alias for OCR backends; failures are opaque to the caller.
pub type OcrResult = Result<String, Box<dyn std::error::Error + Send + Sync>>;

/// A synchronous OCR backend.
///
/// Implementations are called from the blocking extraction thread (see
/// [`crate::pipeline::extract`]), so they may block freely.
pub trait OcrEngine: Send + Sync {
    /// Transcribe a rendered page image.
    fn recognize(&self, image: &RgbImage) -> OcrResult;
}

/// OCR via the `tesseract` command-line binary.
pub struct TesseractOcr {
    language: String,
}

impl TesseractOcr {
    /// Create an engine using the fixed `eng` language model.
    pub fn new() -> Self {
        Self {
            language: "eng".to_string(),
        }
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image: &RgbImage) -> OcrResult {
        let workdir = tempfile::tempdir()?;
        let input_path = workdir.path().join("page.png");
        let output_base = workdir.path().join("page");

        image.save(&input_path)?;

        // `tesseract input output -l eng` writes `output.txt`.
        let output = Command::new("tesseract")
            .arg(&input_path)
            .arg(&output_base)
            .arg("-l")
            .arg(&self.language)
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("tesseract exited with {}: {}", output.status, stderr.trim()).into());
        }

        let text = std::fs::read_to_string(output_base.with_extension("txt"))?;
        debug!("OCR produced {} bytes of text", text.len());
        Ok(text)
    }
}
