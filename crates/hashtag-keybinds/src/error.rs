//! Error types for keybind operations

use thiserror::Error;

/// Errors that can occur while parsing key combinations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Invalid key syntax: {0}")]
    InvalidKeySyntax(String),

    #[error("Invalid modifier: {0}")]
    InvalidModifier(String),

    #[error("Invalid priority: {0}")]
    InvalidPriority(String),
}

/// Errors that can occur in the keybind registry
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Invalid action ID format: {0}")]
    InvalidActionIdFormat(String),

    #[error("Invalid key for action {action_id}: {source}")]
    InvalidKey {
        action_id: String,
        #[source]
        source: ParseError,
    },

    #[error("Key {key} already bound to {action_id}")]
    DuplicateBinding { key: String, action_id: String },
}
