//! Chirp body validation.

mod profanity_filter;

pub use profanity_filter::{ChirpError, DEFAULT_PROFANE_WORDS, MAX_CHIRP_LENGTH, ProfanityFilter};
