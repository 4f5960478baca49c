//! Per-document processing: extract, persist, synthesize.
//!
//! One [`process_document`] call owns one PDF from extraction through
//! synthesis. Documents with no extractable text are skipped before any
//! artifact is created — no text file, no audio file, no service call.
//! Extraction and synthesis errors are not caught here; containment is the
//! orchestrator's job (see [`crate::batch`]).

use crate::config::BatchConfig;
use crate::error::Pdf2SpeechError;
use crate::pipeline::extract::TextExtractor;
use crate::pipeline::speech::synthesize_to_file;
use crate::pipeline::tts::SpeechProvider;
use crate::pipeline::write_atomic;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// An input PDF: its path and the stem naming its outputs.
///
/// Immutable once discovered; consumed exactly once per batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    path: PathBuf,
    stem: String,
}

impl Document {
    /// Wrap a path, deriving the stem. Returns `None` for paths without a
    /// file name (e.g. `/` or `..`).
    pub fn from_path(path: PathBuf) -> Option<Self> {
        let stem = path.file_stem()?.to_string_lossy().into_owned();
        Some(Self { path, stem })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The filename without its extension — the shared key for the
    /// document's text and audio outputs.
    pub fn stem(&self) -> &str {
        &self.stem
    }
}

/// What one document produced.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DocumentOutcome {
    /// Text and audio artifacts are in place.
    Processed {
        stem: String,
        text_path: PathBuf,
        audio_path: PathBuf,
        duration_ms: u64,
    },
    /// The document yielded no extractable text; nothing was created.
    Skipped { stem: String },
}

impl DocumentOutcome {
    pub fn stem(&self) -> &str {
        match self {
            DocumentOutcome::Processed { stem, .. } => stem,
            DocumentOutcome::Skipped { stem } => stem,
        }
    }
}

/// Process a single document: extract text, persist it, synthesize audio.
///
/// Empty or whitespace-only extractions produce a skip notice and
/// [`DocumentOutcome::Skipped`] with no artifacts. All other failures
/// propagate to the caller untouched.
pub async fn process_document(
    document: &Document,
    extractor: &dyn TextExtractor,
    provider: &dyn SpeechProvider,
    config: &BatchConfig,
) -> Result<DocumentOutcome, Pdf2SpeechError> {
    let start = Instant::now();
    let stem = document.stem();

    let text = extractor.extract(document.path()).await?;

    if text.trim().is_empty() {
        info!(
            "No text found in '{}'. Skipping text-to-speech conversion.",
            document.path().display()
        );
        return Ok(DocumentOutcome::Skipped {
            stem: stem.to_string(),
        });
    }

    let text_path = config.output_dir.join(format!("{stem}.txt"));
    write_atomic(&text_path, text.as_bytes())
        .await
        .map_err(|e| Pdf2SpeechError::TextWriteFailed {
            path: text_path.clone(),
            source: e,
        })?;

    let audio_path =
        synthesize_to_file(provider, &text, stem, &config.audio_dir, config).await?;

    let elapsed = start.elapsed();
    info!(
        "Processed '{}' in {:.2} seconds.",
        document.path().display(),
        elapsed.as_secs_f64()
    );

    Ok(DocumentOutcome::Processed {
        stem: stem.to_string(),
        text_path,
        audio_path,
        duration_ms: elapsed.as_millis() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_drops_only_the_extension() {
        let doc = Document::from_path(PathBuf::from("/in/annual.report.pdf")).unwrap();
        assert_eq!(doc.stem(), "annual.report");
    }

    #[test]
    fn stem_of_plain_name() {
        let doc = Document::from_path(PathBuf::from("notes.pdf")).unwrap();
        assert_eq!(doc.stem(), "notes");
    }

    #[test]
    fn rootless_path_is_rejected() {
        assert!(Document::from_path(PathBuf::from("/")).is_none());
    }

    #[test]
    fn outcome_exposes_the_stem() {
        let skipped = DocumentOutcome::Skipped {
            stem: "blank".into(),
        };
        assert_eq!(skipped.stem(), "blank");
    }
}
