//! Document host interface
//!
//! The session never owns document text. It reads a short window before the
//! caret, asks for character bounds when placing the panel, and applies its
//! commit as a batch of [`DocumentEdit`]s. Offsets count characters, and an
//! embedded token occupies exactly one offset.

use std::fmt;

use crate::position::{Rect, Viewport};
use crate::types::{EmbedToken, SelectionRange};

/// Placeholder character hosts report for an embedded token in plain text
pub const OBJECT_REPLACEMENT: char = '\u{FFFC}';

/// A single document mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEdit {
    Delete { offset: usize, length: usize },
    InsertEmbed {
        offset: usize,
        kind: &'static str,
        token: EmbedToken,
    },
    InsertText { offset: usize, text: String },
    SetCaret { offset: usize },
}

/// Read and edit access to the host editor's document
pub trait DocumentHost {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Caret offset, or `None` when the editor has no selection
    fn caret_offset(&self) -> Option<usize>;

    /// Current selection, or `None` when the editor has no selection
    fn selection(&self) -> Option<SelectionRange>;

    /// Plain text of `length` characters starting at `offset`
    fn plain_text(&self, offset: usize, length: usize) -> Result<String, Self::Error>;

    fn delete_range(&mut self, offset: usize, length: usize) -> Result<(), Self::Error>;

    fn insert_embed(
        &mut self,
        offset: usize,
        kind: &'static str,
        token: &EmbedToken,
    ) -> Result<(), Self::Error>;

    fn insert_text(&mut self, offset: usize, text: &str) -> Result<(), Self::Error>;

    fn set_caret(&mut self, offset: usize) -> Result<(), Self::Error>;

    /// Bounds of the character at `offset`, relative to the editor container
    fn bounds_for_offset(&self, offset: usize) -> Result<Rect, Self::Error>;

    /// Screen rectangle of the editor container
    fn container_rect(&self) -> Rect;

    fn viewport(&self) -> Viewport;

    /// Apply edits as one logical operation
    ///
    /// Hosts with batched or transactional edits should override this so the
    /// whole batch is a single undo step.
    fn apply_edits(&mut self, edits: &[DocumentEdit]) -> Result<(), Self::Error> {
        for edit in edits {
            match edit {
                DocumentEdit::Delete { offset, length } => self.delete_range(*offset, *length)?,
                DocumentEdit::InsertEmbed {
                    offset,
                    kind,
                    token,
                } => self.insert_embed(*offset, kind, token)?,
                DocumentEdit::InsertText { offset, text } => self.insert_text(*offset, text)?,
                DocumentEdit::SetCaret { offset } => self.set_caret(*offset)?,
            }
        }
        Ok(())
    }
}

/// One unit of a [`MemoryDocument`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Char(char),
    Embed {
        kind: &'static str,
        token: EmbedToken,
    },
}

/// Errors from [`MemoryDocument`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryDocumentError {
    #[error("Range {offset}..{end} out of bounds for document of length {len}")]
    OutOfBounds { offset: usize, end: usize, len: usize },
}

/// An in-memory single-line document
///
/// Useful for headless hosts and tests. Each character is `char_width` wide
/// and `line_height` tall, starting at the container origin.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<Node>,
    selection: Option<SelectionRange>,
    container: Rect,
    viewport: Viewport,
    char_width: f64,
    line_height: f64,
    batches: usize,
}

impl MemoryDocument {
    pub fn new(text: &str) -> Self {
        let nodes: Vec<Node> = text.chars().map(Node::Char).collect();
        let caret = nodes.len();
        Self {
            nodes,
            selection: Some(SelectionRange::caret(caret)),
            container: Rect::new(0.0, 0.0, 800.0, 600.0),
            viewport: Viewport::new(0.0, 0.0, 1024.0, 768.0),
            char_width: 8.0,
            line_height: 16.0,
            batches: 0,
        }
    }

    pub fn with_container(mut self, container: Rect) -> Self {
        self.container = container;
        self
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of edit batches applied through [`DocumentHost::apply_edits`]
    pub fn batches(&self) -> usize {
        self.batches
    }

    pub fn set_selection(&mut self, selection: Option<SelectionRange>) {
        self.selection = selection;
    }

    /// Insert typed text at the caret and move the caret after it
    pub fn type_text(&mut self, text: &str) -> Result<(), MemoryDocumentError> {
        let at = self.caret_offset().unwrap_or(self.nodes.len());
        self.insert_text(at, text)?;
        self.set_caret(at + text.chars().count())
    }

    /// Embedded tokens in document order
    pub fn embeds(&self) -> Vec<&EmbedToken> {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                Node::Embed { token, .. } => Some(token),
                Node::Char(_) => None,
            })
            .collect()
    }

    fn check_range(&self, offset: usize, length: usize) -> Result<(), MemoryDocumentError> {
        let end = offset + length;
        if end > self.nodes.len() {
            return Err(MemoryDocumentError::OutOfBounds {
                offset,
                end,
                len: self.nodes.len(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for MemoryDocument {
    /// Text with embeds written as `[value](id=..)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            match node {
                Node::Char(c) => write!(f, "{}", c)?,
                Node::Embed { token, .. } => match &token.id {
                    Some(id) => write!(f, "[{}](id={})", token.value, id)?,
                    None => write!(f, "[{}]", token.value)?,
                },
            }
        }
        Ok(())
    }
}

impl DocumentHost for MemoryDocument {
    type Error = MemoryDocumentError;

    fn caret_offset(&self) -> Option<usize> {
        self.selection.map(|range| range.index)
    }

    fn selection(&self) -> Option<SelectionRange> {
        self.selection
    }

    fn plain_text(&self, offset: usize, length: usize) -> Result<String, Self::Error> {
        self.check_range(offset, length)?;
        Ok(self.nodes[offset..offset + length]
            .iter()
            .map(|node| match node {
                Node::Char(c) => *c,
                Node::Embed { .. } => OBJECT_REPLACEMENT,
            })
            .collect())
    }

    fn delete_range(&mut self, offset: usize, length: usize) -> Result<(), Self::Error> {
        self.check_range(offset, length)?;
        self.nodes.drain(offset..offset + length);
        Ok(())
    }

    fn insert_embed(
        &mut self,
        offset: usize,
        kind: &'static str,
        token: &EmbedToken,
    ) -> Result<(), Self::Error> {
        self.check_range(offset, 0)?;
        self.nodes.insert(
            offset,
            Node::Embed {
                kind,
                token: token.clone(),
            },
        );
        Ok(())
    }

    fn insert_text(&mut self, offset: usize, text: &str) -> Result<(), Self::Error> {
        self.check_range(offset, 0)?;
        let tail = self.nodes.split_off(offset);
        self.nodes.extend(text.chars().map(Node::Char));
        self.nodes.extend(tail);
        Ok(())
    }

    fn set_caret(&mut self, offset: usize) -> Result<(), Self::Error> {
        self.check_range(offset, 0)?;
        self.selection = Some(SelectionRange::caret(offset));
        Ok(())
    }

    fn bounds_for_offset(&self, offset: usize) -> Result<Rect, Self::Error> {
        self.check_range(offset, 0)?;
        Ok(Rect::new(
            offset as f64 * self.char_width,
            0.0,
            self.char_width,
            self.line_height,
        ))
    }

    fn container_rect(&self) -> Rect {
        self.container
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn apply_edits(&mut self, edits: &[DocumentEdit]) -> Result<(), Self::Error> {
        // Work on a copy so a failing edit leaves the document untouched.
        let mut staged = self.clone();
        for edit in edits {
            match edit {
                DocumentEdit::Delete { offset, length } => staged.delete_range(*offset, *length)?,
                DocumentEdit::InsertEmbed {
                    offset,
                    kind,
                    token,
                } => staged.insert_embed(*offset, kind, token)?,
                DocumentEdit::InsertText { offset, text } => staged.insert_text(*offset, text)?,
                DocumentEdit::SetCaret { offset } => staged.set_caret(*offset)?,
            }
        }
        staged.batches += 1;
        *self = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_document_plain_text_marks_embeds() {
        let mut doc = MemoryDocument::new("ab");
        doc.insert_embed(1, "hashtag", &EmbedToken { id: None, value: "x".into() })
            .unwrap();
        assert_eq!(doc.plain_text(0, 3).unwrap(), format!("a{}b", OBJECT_REPLACEMENT));
        assert_eq!(doc.to_string(), "a[x]b");
    }

    #[test]
    fn test_memory_document_out_of_bounds() {
        let doc = MemoryDocument::new("abc");
        assert!(matches!(
            doc.plain_text(2, 5),
            Err(MemoryDocumentError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_failed_batch_leaves_document_untouched() {
        let mut doc = MemoryDocument::new("hello");
        let edits = vec![
            DocumentEdit::Delete { offset: 0, length: 2 },
            DocumentEdit::SetCaret { offset: 99 },
        ];
        assert!(doc.apply_edits(&edits).is_err());
        assert_eq!(doc.to_string(), "hello");
        assert_eq!(doc.batches(), 0);
    }

    #[test]
    fn test_type_text_moves_caret() {
        let mut doc = MemoryDocument::new("");
        doc.type_text("#ab").unwrap();
        assert_eq!(doc.caret_offset(), Some(3));
        assert_eq!(doc.to_string(), "#ab");
    }
}
