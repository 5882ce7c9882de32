//! Error types for hashtag completion
//!
//! Document host failures are not wrapped here: every operation that touches
//! the document returns the host's own error type unchanged.

use hashtag_keybinds::ParseError;
use thiserror::Error;

/// Errors that can occur while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid trigger character: {0:?}")]
    InvalidTrigger(char),

    #[error("Invalid query length bounds: min_chars {min} exceeds max_chars {max}")]
    InvalidLengthBounds { min: usize, max: usize },

    #[error("max_chars must be at least 1")]
    ZeroMaxChars,

    #[error("Invalid allowed_chars pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Invalid key binding: {0}")]
    InvalidKey(#[from] ParseError),

    #[error("Configuration error: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors reported by a candidate source
///
/// A failing source never reaches the editor: the session logs it and shows
/// the raw-query fallback candidate instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("Candidate source unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid candidate response: {0}")]
    InvalidResponse(String),

    #[error("Candidate query task failed: {0}")]
    Internal(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
