//! Key combinations and priority-ordered keybind dispatch
//!
//! This crate provides the keybind layer used by hashtag completion:
//! - Key and modifier parsing (`"Ctrl+Enter"`, `"Space"`, `"ArrowUp"`)
//! - Keybind records carrying an explicit [`Priority`]
//! - A registry that runs same-key bindings highest priority first, earliest
//!   registration first, and stops at the first binding that handles the key

pub mod error;
pub mod models;
pub mod registry;

// Re-export public types
pub use error::{ParseError, RegistryError};
pub use models::{Key, KeyCombo, KeyDisposition, Keybind, Modifier, Priority};
pub use registry::KeybindRegistry;
