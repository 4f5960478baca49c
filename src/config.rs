//! Configuration for a PDF-to-speech batch run.
//!
//! All pipeline behaviour is controlled through [`BatchConfig`], built via
//! its [`BatchConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share the config across concurrent document tasks and to diff
//! two runs to understand why their outputs differ.

use crate::error::Pdf2SpeechError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for one batch run.
///
/// Built via [`BatchConfig::builder()`] or [`BatchConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2speech::BatchConfig;
///
/// let config = BatchConfig::builder()
///     .language("en")
///     .parallel(true)
///     .max_retries(10)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct BatchConfig {
    /// Folder receiving the extracted-text files (`<stem>.txt`). Default: `output`.
    pub output_dir: PathBuf,

    /// Folder receiving the audio files (`<stem>.mp3`). Default: `audio`.
    ///
    /// Also the audio cache: a `<stem>.mp3` already present here makes the
    /// synthesizer skip the service call entirely.
    pub audio_dir: PathBuf,

    /// Language code passed to the speech service. Default: `en`.
    pub language: String,

    /// Process documents through a bounded worker pool instead of one at a
    /// time. Default: false.
    pub parallel: bool,

    /// Worker-pool size in parallel mode. Default: `None`, meaning the
    /// available processor count.
    pub concurrency: Option<usize>,

    /// Maximum synthesis attempts per document. Default: 10.
    ///
    /// Only rate-limit failures consume attempts; any other service error
    /// aborts the document immediately.
    pub max_retries: u32,

    /// Initial backoff delay after a rate-limit failure. Default: 5 s.
    ///
    /// Doubles after each rate-limited attempt: 5 s → 10 s → 20 s → …
    pub retry_delay: Duration,

    /// Ceiling on the doubling backoff delay. Default: 300 s.
    ///
    /// Ten uncapped doublings of a 5 s delay would end at ~43 minutes of
    /// sleeping per attempt; the cap bounds a worst-case document to a few
    /// minutes per wait while leaving the early 5/10/20 s sequence intact.
    pub max_backoff: Duration,

    /// Progress-event sink for batch and per-document notices.
    /// Default: `None` (tracing logs only).
    pub progress: Option<ProgressCallback>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            audio_dir: PathBuf::from("audio"),
            language: "en".to_string(),
            parallel: false,
            concurrency: None,
            max_retries: 10,
            retry_delay: Duration::from_secs(5),
            max_backoff: Duration::from_secs(300),
            progress: None,
        }
    }
}

impl fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchConfig")
            .field("output_dir", &self.output_dir)
            .field("audio_dir", &self.audio_dir)
            .field("language", &self.language)
            .field("parallel", &self.parallel)
            .field("concurrency", &self.concurrency)
            .field("max_retries", &self.max_retries)
            .field("retry_delay", &self.retry_delay)
            .field("max_backoff", &self.max_backoff)
            .field("progress", &self.progress.as_ref().map(|_| "<dyn BatchProgressCallback>"))
            .finish()
    }
}

impl BatchConfig {
    /// Create a new builder for `BatchConfig`.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder {
            config: Self::default(),
        }
    }

    /// Worker-pool size for parallel mode: the configured override, or the
    /// available processor count (at least 1).
    pub fn worker_count(&self) -> usize {
        self.concurrency.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

/// Builder for [`BatchConfig`].
#[derive(Debug)]
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn audio_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.audio_dir = dir.into();
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.config.language = language.into();
        self
    }

    pub fn parallel(mut self, v: bool) -> Self {
        self.config.parallel = v;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = Some(n.max(1));
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry_delay = delay;
        self
    }

    pub fn max_backoff(mut self, cap: Duration) -> Self {
        self.config.max_backoff = cap;
        self
    }

    pub fn progress(mut self, callback: ProgressCallback) -> Self {
        self.config.progress = Some(callback);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BatchConfig, Pdf2SpeechError> {
        let c = &self.config;
        if c.max_retries == 0 {
            return Err(Pdf2SpeechError::InvalidConfig(
                "max_retries must be ≥ 1".into(),
            ));
        }
        if c.language.trim().is_empty() {
            return Err(Pdf2SpeechError::InvalidConfig(
                "language must not be empty".into(),
            ));
        }
        if c.max_backoff < c.retry_delay {
            return Err(Pdf2SpeechError::InvalidConfig(format!(
                "max_backoff ({:?}) must be ≥ retry_delay ({:?})",
                c.max_backoff, c.retry_delay
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let c = BatchConfig::default();
        assert_eq!(c.language, "en");
        assert!(!c.parallel);
        assert_eq!(c.max_retries, 10);
        assert_eq!(c.retry_delay, Duration::from_secs(5));
        assert_eq!(c.max_backoff, Duration::from_secs(300));
        assert_eq!(c.output_dir, PathBuf::from("output"));
        assert_eq!(c.audio_dir, PathBuf::from("audio"));
    }

    #[test]
    fn builder_rejects_zero_retries() {
        let result = BatchConfig::builder().max_retries(0).build();
        assert!(matches!(result, Err(Pdf2SpeechError::InvalidConfig(_))));
    }

    #[test]
    fn builder_rejects_empty_language() {
        let result = BatchConfig::builder().language("  ").build();
        assert!(matches!(result, Err(Pdf2SpeechError::InvalidConfig(_))));
    }

    #[test]
    fn builder_rejects_cap_below_initial_delay() {
        let result = BatchConfig::builder()
            .retry_delay(Duration::from_secs(60))
            .max_backoff(Duration::from_secs(30))
            .build();
        assert!(matches!(result, Err(Pdf2SpeechError::InvalidConfig(_))));
    }

    #[test]
    fn concurrency_floor_is_one() {
        let c = BatchConfig::builder().concurrency(0).build().unwrap();
        assert_eq!(c.concurrency, Some(1));
    }

    #[test]
    fn worker_count_defaults_to_available_parallelism() {
        let c = BatchConfig::default();
        assert!(c.worker_count() >= 1);
    }
}
