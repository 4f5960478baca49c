//! Content fingerprints for cached audio artifacts.
//!
//! A [`CacheKey`] is a SHA-256 digest of the extracted text, rendered as a
//! fixed-length hex string. Two keying schemes coexist in the pipeline and
//! it matters which one governs:
//!
//! * **Stem keying (governs cache hits).** The audio file lives at
//!   `<audio_folder>/<stem>.mp3` and the synthesizer's cache check is a
//!   plain presence check on that path. A document whose text changes under
//!   an unchanged filename will keep serving the stale audio file.
//! * **Content keying (informational).** The `CacheKey` is derived from the
//!   text itself and logged alongside every synthesis decision, so a run's
//!   logs are enough to spot a stale hit after the fact.

use sha2::{Digest, Sha256};
use std::fmt;

/// A deterministic fingerprint of a document's extracted text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for a piece of text.
    ///
    /// Stable across runs and platforms: equal text always yields an equal
    /// key, and any change to the text changes it.
    pub fn derive(text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    /// The key as a lowercase hex string (64 characters).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_fixed_length_hex() {
        let key = CacheKey::derive("hello world");
        assert_eq!(key.as_str().len(), 64);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn key_is_deterministic() {
        assert_eq!(CacheKey::derive("same text"), CacheKey::derive("same text"));
    }

    #[test]
    fn key_changes_with_content() {
        assert_ne!(CacheKey::derive("one"), CacheKey::derive("two"));
    }

    #[test]
    fn empty_text_has_a_key() {
        // The synthesizer never sees empty text (the processor skips those
        // documents), but the deriver itself is total.
        assert_eq!(CacheKey::derive("").as_str().len(), 64);
    }
}
