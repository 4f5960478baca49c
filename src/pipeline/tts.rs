//! Speech-synthesis provider: the seam to the remote service.
//!
//! The service is consumed behind [`SpeechProvider`] so the retry loop in
//! [`crate::pipeline::speech`] and the test suite never depend on a live
//! endpoint. The production implementation, [`GoogleTranslateTts`], calls
//! the public Google Translate TTS endpoint and returns raw MP3 bytes.
//!
//! The endpoint bounds the per-request text length, so long documents are
//! split into word-boundary chunks and the returned MP3 segments are
//! concatenated in order — MP3 frames are self-delimiting, so plain byte
//! concatenation yields a playable stream.

use crate::error::TtsError;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Default synthesis endpoint (the one the gTTS ecosystem uses).
pub const DEFAULT_ENDPOINT: &str = "https://translate.google.com/translate_tts";

/// Maximum characters per service request.
const MAX_CHUNK_CHARS: usize = 200;

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// A remote text-to-speech service.
///
/// `synthesize` submits `(text, language)` and resolves to MP3 bytes. The
/// only retryable failure is [`TtsError::RateLimited`]; implementations
/// must map the service's HTTP 429 condition to it and everything else to
/// the other [`TtsError`] classes. The provider itself never retries.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, TtsError>;
}

/// Speech synthesis via the Google Translate TTS endpoint.
pub struct GoogleTranslateTts {
    client: reqwest::Client,
    endpoint: String,
}

impl GoogleTranslateTts {
    /// Create a provider against the default endpoint.
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Create a provider against a custom endpoint (e.g. a local proxy).
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    async fn fetch_chunk(&self, chunk: &str, language: &str) -> Result<Vec<u8>, TtsError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", language),
                ("q", chunk),
            ])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| TtsError::Network {
                detail: e.to_string(),
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok());
            return Err(TtsError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(TtsError::Http {
                status: status.as_u16(),
                detail: detail.chars().take(200).collect(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| TtsError::Network {
            detail: e.to_string(),
        })?;

        Ok(bytes.to_vec())
    }
}

impl Default for GoogleTranslateTts {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechProvider for GoogleTranslateTts {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, TtsError> {
        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        debug!("Synthesizing {} chunks ({} chars total)", chunks.len(), text.len());

        let mut audio = Vec::new();
        for chunk in &chunks {
            let bytes = self.fetch_chunk(chunk, language).await?;
            audio.extend_from_slice(&bytes);
        }

        if audio.is_empty() {
            return Err(TtsError::EmptyAudio);
        }

        Ok(audio)
    }
}

/// Split text into whitespace-normalised chunks of at most `max_chars`
/// characters, breaking only at word boundaries.
///
/// A single word longer than `max_chars` becomes its own chunk rather than
/// being cut mid-word; the service tolerates the occasional long token
/// better than a token split in half.
fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;

    for word in text.split_whitespace() {
        let word_chars = word.chars().count();

        if current_chars > 0 && current_chars + 1 + word_chars > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_chars = 0;
        }

        if current_chars > 0 {
            current.push(' ');
            current_chars += 1;
        }
        current.push_str(word);
        current_chars += word_chars;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(chunk_text("hello world", 200), vec!["hello world"]);
    }

    #[test]
    fn long_text_splits_at_word_boundaries() {
        let text = "alpha beta gamma delta";
        let chunks = chunk_text(text, 11);
        assert_eq!(chunks, vec!["alpha beta", "gamma delta"]);
    }

    #[test]
    fn no_chunk_exceeds_the_limit() {
        let text = "one two three four five six seven eight nine ten".repeat(20);
        for chunk in chunk_text(&text, 40) {
            assert!(chunk.chars().count() <= 40, "oversized chunk: {chunk:?}");
        }
    }

    #[test]
    fn all_words_survive_chunking() {
        let text = "the quick brown fox jumps over the lazy dog";
        let rejoined = chunk_text(text, 10).join(" ");
        assert_eq!(rejoined, text);
    }

    #[test]
    fn oversized_word_becomes_its_own_chunk() {
        let chunks = chunk_text("short pneumonoultramicroscopicsilicovolcanoconiosis end", 10);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1], "pneumonoultramicroscopicsilicovolcanoconiosis");
    }

    #[test]
    fn whitespace_only_text_yields_no_chunks() {
        assert!(chunk_text("  \n\t  ", 200).is_empty());
    }

    #[test]
    fn multibyte_text_counts_chars_not_bytes() {
        let text = "héllo wörld ünïcode";
        for chunk in chunk_text(text, 11) {
            assert!(chunk.chars().count() <= 11);
        }
    }
}
