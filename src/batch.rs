//! Batch orchestration: discover PDFs, fan out document processing.
//!
//! ## Scheduling
//!
//! Sequential mode processes documents one at a time in discovery order
//! (the order the directory listing returns — filesystem-defined, not
//! guaranteed alphabetical) and aborts the remaining batch on the first
//! error.
//!
//! Parallel mode drives all documents through
//! `futures::stream::buffer_unordered` with a pool sized to the available
//! processor count, collecting results in completion order. A failing
//! document never cancels its siblings: every dispatched unit runs to its
//! own success, skip, or error, and only then does the orchestrator report
//! a single [`Pdf2SpeechError::BatchFailed`] covering all failures. The
//! successful siblings' artifacts stay on disk either way.

use crate::config::BatchConfig;
use crate::document::{process_document, Document, DocumentOutcome};
use crate::error::Pdf2SpeechError;
use crate::pipeline::extract::TextExtractor;
use crate::pipeline::tts::SpeechProvider;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Aggregate counters for one batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchStats {
    /// PDFs discovered in the input folder.
    pub total_documents: usize,
    /// Documents with both artifacts in place.
    pub processed: usize,
    /// Documents skipped for having no extractable text.
    pub skipped: usize,
    /// Documents that raised an error (parallel mode only; sequential mode
    /// aborts on the first error instead of counting).
    pub failed: usize,
    /// Wall-clock duration of the whole run.
    pub total_duration_ms: u64,
}

/// List the PDF documents directly inside `input_dir` (non-recursive), in
/// the order the directory listing returns them.
pub fn discover_documents(input_dir: &Path) -> Result<Vec<Document>, Pdf2SpeechError> {
    let entries = std::fs::read_dir(input_dir).map_err(|_| Pdf2SpeechError::InputDirNotFound {
        path: input_dir.to_path_buf(),
    })?;

    let mut documents = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Pdf2SpeechError::Internal(format!("readdir: {e}")))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_pdf = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            continue;
        }
        if let Some(doc) = Document::from_path(path) {
            documents.push(doc);
        }
    }

    Ok(documents)
}

/// Process every PDF in `input_dir` according to `config`.
///
/// Returns the run's [`BatchStats`] when every document succeeded or was
/// skipped. In sequential mode the first error aborts the remaining batch
/// and is returned as-is; in parallel mode all units run to completion and
/// any failures are rolled up into [`Pdf2SpeechError::BatchFailed`].
pub async fn run_batch(
    input_dir: &Path,
    extractor: &dyn TextExtractor,
    provider: &dyn SpeechProvider,
    config: &BatchConfig,
) -> Result<BatchStats, Pdf2SpeechError> {
    let start = Instant::now();

    let documents = discover_documents(input_dir)?;
    info!(
        "Found {} PDF documents in '{}'",
        documents.len(),
        input_dir.display()
    );

    if let Some(cb) = &config.progress {
        cb.on_batch_start(documents.len());
    }

    let mut stats = BatchStats {
        total_documents: documents.len(),
        ..BatchStats::default()
    };

    if config.parallel {
        let workers = config.worker_count();
        info!("Processing in parallel with {workers} workers");

        let results: Vec<Result<DocumentOutcome, Pdf2SpeechError>> =
            stream::iter(
                documents
                    .iter()
                    .map(|doc| process_unit(doc, extractor, provider, config)),
            )
            .buffer_unordered(workers)
            .collect()
            .await;

        let mut first_error: Option<String> = None;
        for result in results {
            match result {
                Ok(outcome) => stats.tally(&outcome),
                Err(e) => {
                    stats.failed += 1;
                    first_error.get_or_insert_with(|| e.to_string());
                }
            }
        }

        if let Some(cb) = &config.progress {
            cb.on_batch_complete(stats.processed, stats.skipped, stats.failed);
        }

        if let Some(first_error) = first_error {
            return Err(Pdf2SpeechError::BatchFailed {
                failed: stats.failed,
                total: stats.total_documents,
                first_error,
            });
        }
    } else {
        for doc in &documents {
            let outcome = process_unit(doc, extractor, provider, config).await?;
            stats.tally(&outcome);
        }

        if let Some(cb) = &config.progress {
            cb.on_batch_complete(stats.processed, stats.skipped, stats.failed);
        }
    }

    stats.total_duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Batch complete: {} processed, {} skipped, {} failed in {}ms",
        stats.processed, stats.skipped, stats.failed, stats.total_duration_ms
    );

    Ok(stats)
}

impl BatchStats {
    fn tally(&mut self, outcome: &DocumentOutcome) {
        match outcome {
            DocumentOutcome::Processed { .. } => self.processed += 1,
            DocumentOutcome::Skipped { .. } => self.skipped += 1,
        }
    }
}

/// One unit of work: a document plus its progress events.
async fn process_unit(
    document: &Document,
    extractor: &dyn TextExtractor,
    provider: &dyn SpeechProvider,
    config: &BatchConfig,
) -> Result<DocumentOutcome, Pdf2SpeechError> {
    if let Some(cb) = &config.progress {
        cb.on_document_start(document.stem());
    }

    let result = process_document(document, extractor, provider, config).await;

    if let Some(cb) = &config.progress {
        match &result {
            Ok(DocumentOutcome::Processed { duration_ms, .. }) => cb.on_document_complete(
                document.stem(),
                std::time::Duration::from_millis(*duration_ms),
            ),
            Ok(DocumentOutcome::Skipped { .. }) => cb.on_document_skipped(document.stem()),
            Err(e) => {
                warn!("Document '{}' failed: {e}", document.stem());
                cb.on_document_error(document.stem(), &e.to_string());
            }
        }
    } else if let Err(e) = &result {
        warn!("Document '{}' failed: {e}", document.stem());
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn discovery_keeps_only_pdf_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("report.pdf"), b"%PDF-1.4").unwrap();
        fs::write(dir.path().join("SCAN.PDF"), b"%PDF-1.4").unwrap();
        fs::write(dir.path().join("notes.txt"), b"plain").unwrap();
        fs::write(dir.path().join("no_extension"), b"??").unwrap();

        let mut stems: Vec<_> = discover_documents(dir.path())
            .unwrap()
            .into_iter()
            .map(|d| d.stem().to_string())
            .collect();
        stems.sort();

        assert_eq!(stems, vec!["SCAN", "report"]);
    }

    #[test]
    fn discovery_is_non_recursive() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/inner.pdf"), b"%PDF-1.4").unwrap();
        fs::write(dir.path().join("top.pdf"), b"%PDF-1.4").unwrap();

        let docs = discover_documents(dir.path()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].stem(), "top");
    }

    #[test]
    fn discovery_skips_directories_named_like_pdfs() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("fake.pdf")).unwrap();

        assert!(discover_documents(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn discovery_of_missing_folder_fails() {
        let err = discover_documents(Path::new("/no/such/folder")).unwrap_err();
        assert!(matches!(err, Pdf2SpeechError::InputDirNotFound { .. }));
    }

    #[test]
    fn empty_folder_yields_no_documents() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_documents(dir.path()).unwrap().is_empty());
    }
}
