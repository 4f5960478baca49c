//! Text extraction: native PDF text with per-page OCR fallback.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. `tokio::task::spawn_blocking` moves the work onto a dedicated
//! thread pool thread designed for blocking operations, preventing the
//! Tokio worker threads from stalling during parsing, rendering, and OCR.
//!
//! ## Fallback rule
//!
//! A page with a text layer contributes that text verbatim. A page whose
//! text layer is empty (typical for scans) is rasterised, normalised to
//! RGB, and handed to the [`OcrEngine`]. Page results are appended in page
//! order with no separator — the concatenation is exactly what the page
//! contents yield.

use crate::error::Pdf2SpeechError;
use crate::pipeline::ocr::OcrEngine;
use async_trait::async_trait;
use image::RgbImage;
use pdfium_render::prelude::*;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Produces a document's full text, or an empty string if nothing is
/// extractable.
///
/// The trait exists so the document processor (and the test suite) consume
/// extraction as the black-box collaborator it is; [`PdfiumExtractor`] is
/// the production implementation.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, pdf_path: &Path) -> Result<String, Pdf2SpeechError>;
}

/// Extraction backed by pdfium, with OCR fallback for pages that have no
/// text layer.
pub struct PdfiumExtractor {
    ocr: Arc<dyn OcrEngine>,
    max_rendered_pixels: u32,
}

impl PdfiumExtractor {
    /// Create an extractor with the default rendered-page size cap (2000 px
    /// on the longest edge).
    ///
    /// The cap bounds memory regardless of physical page size: an A0 poster
    /// rendered uncapped could allocate hundreds of megapixels before OCR
    /// even starts.
    pub fn new(ocr: Arc<dyn OcrEngine>) -> Self {
        Self {
            ocr,
            max_rendered_pixels: 2000,
        }
    }

    /// Override the rendered-page size cap.
    pub fn with_max_rendered_pixels(mut self, px: u32) -> Self {
        self.max_rendered_pixels = px.max(100);
        self
    }
}

#[async_trait]
impl TextExtractor for PdfiumExtractor {
    async fn extract(&self, pdf_path: &Path) -> Result<String, Pdf2SpeechError> {
        validate_pdf_input(pdf_path)?;

        let path = pdf_path.to_path_buf();
        let max_pixels = self.max_rendered_pixels;
        let ocr = Arc::clone(&self.ocr);

        tokio::task::spawn_blocking(move || extract_blocking(&path, max_pixels, ocr.as_ref()))
            .await
            .map_err(|e| Pdf2SpeechError::Internal(format!("Extraction task panicked: {e}")))?
    }
}

/// Validate the input file exists, is readable, and carries the PDF magic
/// bytes, so callers get a precise error instead of an opaque engine
/// failure.
fn validate_pdf_input(path: &Path) -> Result<(), Pdf2SpeechError> {
    if !path.exists() {
        return Err(Pdf2SpeechError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(mut f) => {
            use std::io::Read;
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(Pdf2SpeechError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2SpeechError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(Pdf2SpeechError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    }

    Ok(())
}

/// Blocking implementation of the page loop.
fn extract_blocking(
    pdf_path: &Path,
    max_pixels: u32,
    ocr: &dyn OcrEngine,
) -> Result<String, Pdf2SpeechError> {
    let pdfium = Pdfium::default();

    let document =
        pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| Pdf2SpeechError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: format!("{e:?}"),
            })?;

    let pages = document.pages();
    debug!("PDF loaded: {} pages", pages.len());

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let mut text = String::new();

    for (index, page) in pages.iter().enumerate() {
        let page_num = index + 1;

        let native = page
            .text()
            .map(|t| t.all())
            .map_err(|e| Pdf2SpeechError::PageTextFailed {
                page: page_num,
                detail: format!("{e:?}"),
            })?;

        append_page_text(
            &mut text,
            page_num,
            native,
            || {
                let bitmap = page.render_with_config(&render_config).map_err(|e| {
                    Pdf2SpeechError::RenderFailed {
                        page: page_num,
                        detail: format!("{e:?}"),
                    }
                })?;
                Ok(bitmap.as_image().to_rgb8())
            },
            ocr,
        )?;
    }

    Ok(text)
}

/// Append one page's contribution: native text when present, OCR output
/// otherwise.
///
/// `render` is only invoked on the fallback path, so pages with a text
/// layer never pay for rasterisation.
fn append_page_text(
    text: &mut String,
    page_num: usize,
    native: String,
    render: impl FnOnce() -> Result<RgbImage, Pdf2SpeechError>,
    ocr: &dyn OcrEngine,
) -> Result<(), Pdf2SpeechError> {
    if !native.is_empty() {
        text.push_str(&native);
        return Ok(());
    }

    debug!("Page {page_num} has no text layer, falling back to OCR");
    let image = render()?;
    let recognized = ocr
        .recognize(&image)
        .map_err(|e| Pdf2SpeechError::OcrFailed {
            page: page_num,
            detail: e.to_string(),
        })?;
    text.push_str(&recognized);
    Ok(())
}
