//! Length validation and profanity masking of chirp bodies.

use std::sync::Arc;

/// Maximum chirp length, in characters.
pub const MAX_CHIRP_LENGTH: usize = 140;

/// Words masked by the default filter.
pub const DEFAULT_PROFANE_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];

/// Replacement for a masked word.
const MASK: &str = "****";

/// Reasons a chirp body is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChirpError {
    #[error("Chirp is too long: {length} characters, at most {max} allowed")]
    TooLong { length: usize, max: usize },
}

/// Masks profane words in chirp bodies.
///
/// Words are split on single spaces and compared case-insensitively; a word
/// with attached punctuation (`Sharbert!`) is left untouched.
#[derive(Debug, Clone)]
pub struct ProfanityFilter {
    words: Arc<[String]>,
}

impl ProfanityFilter {
    /// Creates a filter masking `words`.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|word| word.as_ref().to_lowercase())
            .collect();

        Self { words }
    }

    /// Replaces every profane word with `****`.
    pub fn clean(&self, body: &str) -> String {
        body.split(' ')
            .map(|word| {
                let lowered = word.to_lowercase();
                if self.words.iter().any(|profane| *profane == lowered) {
                    MASK
                } else {
                    word
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Checks the length of `body` and returns its cleaned form.
    pub fn validate(&self, body: &str) -> Result<String, ChirpError> {
        let length = body.chars().count();
        if length > MAX_CHIRP_LENGTH {
            return Err(ChirpError::TooLong {
                length,
                max: MAX_CHIRP_LENGTH,
            });
        }

        Ok(self.clean(body))
    }
}

impl Default for ProfanityFilter {
    fn default() -> Self {
        Self::new(DEFAULT_PROFANE_WORDS)
    }
}
