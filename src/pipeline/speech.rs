//! Cache-aware speech synthesis with retry and capped exponential backoff.
//!
//! ## Retry strategy
//!
//! Rate-limit responses (HTTP 429) from public TTS endpoints are routine
//! under batch load. Each call keeps its own [`Backoff`] — attempt counter
//! and current delay — so concurrent documents back off independently. The
//! delay doubles after every rate-limited attempt (5 s → 10 s → 20 s → …)
//! up to a configurable ceiling; an uncapped tenth doubling would sleep for
//! over 40 minutes. Any non-rate-limit error aborts immediately without a
//! retry, and spending the whole attempt budget raises
//! [`Pdf2SpeechError::RetriesExhausted`] rather than the last service error.
//!
//! ## Caching
//!
//! The audio folder doubles as the cache: a `<filename>.mp3` already
//! present wins before any service call. The governing key is the output
//! filename (document stem) — the content-hash [`CacheKey`] is derived and
//! logged for every call, but a changed document under an unchanged stem
//! still hits the stale file. See [`crate::cache`].

use crate::cache::CacheKey;
use crate::config::BatchConfig;
use crate::error::{Pdf2SpeechError, TtsError};
use crate::pipeline::tts::SpeechProvider;
use crate::pipeline::write_atomic;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Per-call retry state: the current delay and its ceiling.
///
/// Local to one synthesis call by construction — never shared, so
/// concurrent calls cannot disturb each other's schedule.
#[derive(Debug)]
pub struct Backoff {
    delay: Duration,
    cap: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, cap: Duration) -> Self {
        Self {
            delay: initial.min(cap),
            cap,
        }
    }

    /// The delay to sleep before the next attempt; doubles the stored delay
    /// up to the cap.
    pub fn next_delay(&mut self) -> Duration {
        let current = self.delay;
        self.delay = self.delay.saturating_mul(2).min(self.cap);
        current
    }
}

/// Synthesize `text` into `<audio_dir>/<filename>.mp3` and return the path.
///
/// Skips the service entirely when the output file already exists. On a
/// rate-limited attempt, sleeps the current backoff delay and tries again,
/// up to `config.max_retries` attempts in total; the sleep suspends only
/// the calling task. The file is written atomically (temp + rename) so a
/// crash mid-write cannot leave a partial file for the presence check to
/// trust on the next run.
pub async fn synthesize_to_file(
    provider: &dyn SpeechProvider,
    text: &str,
    filename: &str,
    audio_dir: &Path,
    config: &BatchConfig,
) -> Result<PathBuf, Pdf2SpeechError> {
    let audio_path = audio_dir.join(format!("{filename}.mp3"));

    let key = CacheKey::derive(text);
    debug!(cache_key = %key, "Content fingerprint for '{filename}'");

    if audio_path.exists() {
        info!("Using existing audio file for '{filename}'");
        return Ok(audio_path);
    }

    let mut backoff = Backoff::new(config.retry_delay, config.max_backoff);

    for attempt in 1..=config.max_retries {
        match provider.synthesize(text, &config.language).await {
            Ok(audio) => {
                write_atomic(&audio_path, &audio).await.map_err(|e| {
                    Pdf2SpeechError::AudioWriteFailed {
                        path: audio_path.clone(),
                        source: e,
                    }
                })?;
                debug!("Wrote {} audio bytes for '{filename}'", audio.len());
                return Ok(audio_path);
            }
            Err(TtsError::RateLimited { .. }) => {
                if attempt < config.max_retries {
                    let delay = backoff.next_delay();
                    warn!(
                        "Rate limit hit for '{filename}', retrying in {}s (attempt {attempt}/{})",
                        delay.as_secs(),
                        config.max_retries
                    );
                    sleep(delay).await;
                }
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(Pdf2SpeechError::RetriesExhausted {
        attempts: config.max_retries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_from_the_initial_delay() {
        let mut b = Backoff::new(Duration::from_secs(5), Duration::from_secs(300));
        assert_eq!(b.next_delay(), Duration::from_secs(5));
        assert_eq!(b.next_delay(), Duration::from_secs(10));
        assert_eq!(b.next_delay(), Duration::from_secs(20));
        assert_eq!(b.next_delay(), Duration::from_secs(40));
    }

    #[test]
    fn backoff_stops_doubling_at_the_cap() {
        let mut b = Backoff::new(Duration::from_secs(5), Duration::from_secs(20));
        assert_eq!(b.next_delay(), Duration::from_secs(5));
        assert_eq!(b.next_delay(), Duration::from_secs(10));
        assert_eq!(b.next_delay(), Duration::from_secs(20));
        assert_eq!(b.next_delay(), Duration::from_secs(20));
        assert_eq!(b.next_delay(), Duration::from_secs(20));
    }

    #[test]
    fn backoff_clamps_an_initial_delay_above_the_cap() {
        let mut b = Backoff::new(Duration::from_secs(600), Duration::from_secs(300));
        assert_eq!(b.next_delay(), Duration::from_secs(300));
        assert_eq!(b.next_delay(), Duration::from_secs(300));
    }

    #[test]
    fn independent_backoffs_do_not_interfere() {
        let mut a = Backoff::new(Duration::from_secs(5), Duration::from_secs(300));
        let mut b = Backoff::new(Duration::from_secs(5), Duration::from_secs(300));
        a.next_delay();
        a.next_delay();
        assert_eq!(b.next_delay(), Duration::from_secs(5));
    }
}
