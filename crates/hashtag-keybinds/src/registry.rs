//! Keybind registry with priority-ordered dispatch
//!
//! Several bindings may share one key combination. They are kept ordered by
//! [`Priority`] (highest first) and, within one priority, by registration
//! order (earliest first). Dispatch offers the key to each binding in that
//! order until one reports [`KeyDisposition::Handled`].

use std::collections::HashMap;

use crate::{
    error::RegistryError,
    models::{KeyCombo, KeyDisposition, Keybind, Priority},
};

#[derive(Debug, Clone)]
struct Entry {
    keybind: Keybind,
    sequence: u64,
}

/// Registry for storing and dispatching keybinds
#[derive(Debug, Default)]
pub struct KeybindRegistry {
    /// Map from key combination to its bindings, in dispatch order
    by_key: HashMap<KeyCombo, Vec<Entry>>,
    next_sequence: u64,
}

impl KeybindRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a keybind
    pub fn register(&mut self, keybind: Keybind) -> Result<(), RegistryError> {
        if keybind.action_id.trim().is_empty() {
            return Err(RegistryError::InvalidActionIdFormat(
                "Action ID cannot be empty".to_string(),
            ));
        }

        let combo = keybind
            .parse_key()
            .map_err(|source| RegistryError::InvalidKey {
                action_id: keybind.action_id.clone(),
                source,
            })?;

        let entries = self.by_key.entry(combo.clone()).or_default();
        if entries
            .iter()
            .any(|entry| entry.keybind.action_id == keybind.action_id)
        {
            return Err(RegistryError::DuplicateBinding {
                key: combo.to_string(),
                action_id: keybind.action_id,
            });
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        // Insert after every entry that must run before this one.
        let position = entries
            .iter()
            .position(|entry| entry.keybind.priority < keybind.priority)
            .unwrap_or(entries.len());

        tracing::trace!(
            key = %combo,
            action_id = %keybind.action_id,
            priority = %keybind.priority,
            position,
            "registered keybind"
        );

        entries.insert(position, Entry { keybind, sequence });
        Ok(())
    }

    /// Register several keybinds, stopping at the first failure
    pub fn register_all(
        &mut self,
        keybinds: impl IntoIterator<Item = Keybind>,
    ) -> Result<(), RegistryError> {
        for keybind in keybinds {
            self.register(keybind)?;
        }
        Ok(())
    }

    /// Remove every binding for an action, returning how many were removed
    pub fn unregister_action(&mut self, action_id: &str) -> usize {
        let mut removed = 0;
        for entries in self.by_key.values_mut() {
            let before = entries.len();
            entries.retain(|entry| entry.keybind.action_id != action_id);
            removed += before - entries.len();
        }
        self.by_key.retain(|_, entries| !entries.is_empty());
        removed
    }

    /// Bindings for a key combination, in dispatch order
    pub fn lookup(&self, key: &KeyCombo) -> Vec<&Keybind> {
        self.by_key
            .get(key)
            .map(|entries| entries.iter().map(|entry| &entry.keybind).collect())
            .unwrap_or_default()
    }

    /// Offer a key to its bindings in order until one handles it
    ///
    /// Returns [`KeyDisposition::Unhandled`] when every binding passes, in which
    /// case the caller applies its default handling.
    pub fn dispatch<E>(
        &self,
        key: &KeyCombo,
        mut handler: impl FnMut(&Keybind) -> Result<KeyDisposition, E>,
    ) -> Result<KeyDisposition, E> {
        let Some(entries) = self.by_key.get(key) else {
            return Ok(KeyDisposition::Unhandled);
        };

        for entry in entries {
            if handler(&entry.keybind)?.is_handled() {
                tracing::trace!(
                    key = %key,
                    action_id = %entry.keybind.action_id,
                    sequence = entry.sequence,
                    "key handled"
                );
                return Ok(KeyDisposition::Handled);
            }
        }

        Ok(KeyDisposition::Unhandled)
    }

    /// Highest priority currently bound to a key
    pub fn top_priority(&self, key: &KeyCombo) -> Option<Priority> {
        self.by_key
            .get(key)
            .and_then(|entries| entries.first())
            .map(|entry| entry.keybind.priority)
    }

    /// Get all keybinds
    pub fn all_keybinds(&self) -> Vec<&Keybind> {
        let mut entries: Vec<&Entry> = self.by_key.values().flatten().collect();
        entries.sort_by_key(|entry| entry.sequence);
        entries.into_iter().map(|entry| &entry.keybind).collect()
    }

    /// Number of registered bindings
    pub fn len(&self) -> usize {
        self.by_key.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_key.clear();
    }
}
