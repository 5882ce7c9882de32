//! Core data models for keybinds

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Represents a keyboard modifier (Ctrl, Shift, Alt, Meta)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Ctrl,
    Shift,
    Alt,
    Meta,
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::Ctrl => write!(f, "Ctrl"),
            Modifier::Shift => write!(f, "Shift"),
            Modifier::Alt => write!(f, "Alt"),
            Modifier::Meta => write!(f, "Meta"),
        }
    }
}

impl FromStr for Modifier {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ctrl" | "control" => Ok(Modifier::Ctrl),
            "shift" => Ok(Modifier::Shift),
            "alt" | "option" => Ok(Modifier::Alt),
            "meta" | "cmd" | "command" => Ok(Modifier::Meta),
            _ => Err(ParseError::InvalidModifier(s.to_string())),
        }
    }
}

/// Represents a key on the keyboard
///
/// The space bar is `Char(' ')` and is written `Space` in key strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Home,
    End,
    Up,
    Down,
    Left,
    Right,
}

impl Key {
    /// The space bar
    pub const SPACE: Key = Key::Char(' ');
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(' ') => write!(f, "Space"),
            Key::Char(c) => write!(f, "{}", c),
            Key::Enter => write!(f, "Enter"),
            Key::Escape => write!(f, "Escape"),
            Key::Tab => write!(f, "Tab"),
            Key::Backspace => write!(f, "Backspace"),
            Key::Delete => write!(f, "Delete"),
            Key::Home => write!(f, "Home"),
            Key::End => write!(f, "End"),
            Key::Up => write!(f, "Up"),
            Key::Down => write!(f, "Down"),
            Key::Left => write!(f, "Left"),
            Key::Right => write!(f, "Right"),
        }
    }
}

impl FromStr for Key {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(Key::Char(c));
        }

        match s.trim().to_lowercase().as_str() {
            "enter" | "return" => Ok(Key::Enter),
            "escape" | "esc" => Ok(Key::Escape),
            "tab" => Ok(Key::Tab),
            "space" | "spacebar" => Ok(Key::SPACE),
            "backspace" | "bksp" => Ok(Key::Backspace),
            "delete" | "del" => Ok(Key::Delete),
            "home" => Ok(Key::Home),
            "end" => Ok(Key::End),
            "up" | "arrowup" => Ok(Key::Up),
            "down" | "arrowdown" => Ok(Key::Down),
            "left" | "arrowleft" => Ok(Key::Left),
            "right" | "arrowright" => Ok(Key::Right),
            _ => Err(ParseError::InvalidKeySyntax(format!("Unknown key: {}", s))),
        }
    }
}

/// Represents a key combination (modifiers + key)
///
/// Modifiers are kept sorted and deduplicated so that `Shift+Ctrl+A` and
/// `Ctrl+Shift+A` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyCombo {
    pub modifiers: Vec<Modifier>,
    pub key: Key,
}

impl KeyCombo {
    /// A key pressed without modifiers
    pub fn plain(key: Key) -> Self {
        KeyCombo {
            modifiers: Vec::new(),
            key,
        }
    }

    pub fn with_modifiers(mut modifiers: Vec<Modifier>, key: Key) -> Self {
        modifiers.sort();
        modifiers.dedup();
        KeyCombo { modifiers, key }
    }
}

impl From<Key> for KeyCombo {
    fn from(key: Key) -> Self {
        KeyCombo::plain(key)
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{}+", modifier)?;
        }
        write!(f, "{}", self.key)
    }
}

impl FromStr for KeyCombo {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseError::InvalidKeySyntax(
                "Empty key combination".to_string(),
            ));
        }

        // A lone "+" is the plus key, a trailing "++" is Modifier+Plus.
        let (prefix, key_part) = match s.strip_suffix("++") {
            Some(rest) => (rest, "+"),
            None => match s.rfind('+') {
                Some(idx) if idx + 1 < s.len() => (&s[..idx], &s[idx + 1..]),
                Some(_) if s == "+" => ("", "+"),
                Some(_) => {
                    return Err(ParseError::InvalidKeySyntax(format!(
                        "Dangling modifier in: {}",
                        s
                    )))
                }
                None => ("", s),
            },
        };

        let mut modifiers = Vec::new();
        if !prefix.is_empty() {
            for part in prefix.split('+') {
                modifiers.push(Modifier::from_str(part)?);
            }
        }

        let key = Key::from_str(key_part)?;

        Ok(KeyCombo::with_modifiers(modifiers, key))
    }
}

/// Ordering of bindings that share a key combination.
///
/// Higher priorities run first; equal priorities run in registration order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Normal => write!(f, "normal"),
            Priority::High => write!(f, "high"),
        }
    }
}

impl FromStr for Priority {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "normal" | "default" => Ok(Priority::Normal),
            "high" => Ok(Priority::High),
            _ => Err(ParseError::InvalidPriority(s.to_string())),
        }
    }
}

/// Result of offering a key to a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// The binding consumed the key; later bindings and default handling are skipped
    Handled,
    /// The key continues to the next binding, then to default handling
    Unhandled,
}

impl KeyDisposition {
    pub fn is_handled(self) -> bool {
        self == KeyDisposition::Handled
    }
}

/// Represents a single keybind configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keybind {
    pub action_id: String,
    pub key: String,
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
}

impl Keybind {
    /// Create a new keybind at normal priority
    pub fn new(
        action_id: impl Into<String>,
        key: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Keybind {
            action_id: action_id.into(),
            key: key.into(),
            category: category.into(),
            description: description.into(),
            priority: Priority::Normal,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Parse the key string into a KeyCombo
    pub fn parse_key(&self) -> Result<KeyCombo, ParseError> {
        KeyCombo::from_str(&self.key)
    }
}
