//! Core data types shared by the completion components

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Embed kind used when inserting a completed token into the document
pub const EMBED_KIND: &str = "hashtag";

/// One suggested completion returned by a candidate source
///
/// Only `id` and `value` are interpreted; any other fields the source sends
/// are carried in `extra` for item renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: Option<String>,
    pub value: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Sources may send ids as strings or numbers; both become strings
fn deserialize_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(id)) => Ok(Some(id)),
        Some(Value::Number(id)) => Ok(Some(id.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "candidate id must be a string or number, got {other}"
        ))),
    }
}

impl Candidate {
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            value: value.into(),
            extra: Map::new(),
        }
    }

    /// A candidate with no identity, standing for the typed query itself
    pub fn raw(value: impl Into<String>) -> Self {
        Self {
            id: None,
            value: value.into(),
            extra: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn is_raw(&self) -> bool {
        self.id.is_none()
    }

    pub fn to_token(&self) -> EmbedToken {
        EmbedToken {
            id: self.id.clone(),
            value: self.value.clone(),
        }
    }
}

/// The atomic token inserted into the document on commit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmbedToken {
    pub id: Option<String>,
    pub value: String,
}

impl From<&Candidate> for EmbedToken {
    fn from(candidate: &Candidate) -> Self {
        candidate.to_token()
    }
}

/// Document offset of the trigger character currently being completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriggerSpan {
    pub start_offset: usize,
    pub trigger_char: char,
}

/// A document selection; `length == 0` is a plain caret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SelectionRange {
    pub index: usize,
    pub length: usize,
}

impl SelectionRange {
    pub fn caret(index: usize) -> Self {
        Self { index, length: 0 }
    }

    pub fn new(index: usize, length: usize) -> Self {
        Self { index, length }
    }

    pub fn is_caret(&self) -> bool {
        self.length == 0
    }
}

/// Who caused a document change
///
/// Only user edits run trigger detection, so edits made by the session itself
/// (tagged `Api`) never feed back into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeSource {
    #[default]
    User,
    Api,
    Silent,
}

impl ChangeSource {
    pub fn is_user(self) -> bool {
        self == ChangeSource::User
    }
}
