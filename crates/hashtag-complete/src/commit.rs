//! Replace-and-embed commit

use crate::host::{DocumentEdit, DocumentHost};
use crate::types::{Candidate, EmbedToken, TriggerSpan, EMBED_KIND};

/// Replaces the trigger and query text with an embedded token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionCommitter {
    kind: &'static str,
}

impl Default for SelectionCommitter {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionCommitter {
    pub fn new() -> Self {
        Self { kind: EMBED_KIND }
    }

    /// Use a different embed kind for inserted tokens
    pub fn with_kind(kind: &'static str) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// The edits that commit `token` over `[span.start_offset, caret)`
    ///
    /// The token takes one offset, so the trailing space lands at
    /// `start + 1` and the caret ends at `start + 2`.
    pub fn plan(&self, span: TriggerSpan, caret: usize, token: EmbedToken) -> Vec<DocumentEdit> {
        let start = span.start_offset;
        vec![
            DocumentEdit::Delete {
                offset: start,
                length: caret.saturating_sub(start),
            },
            DocumentEdit::InsertEmbed {
                offset: start,
                kind: self.kind,
                token,
            },
            DocumentEdit::InsertText {
                offset: start + 1,
                text: " ".to_string(),
            },
            DocumentEdit::SetCaret { offset: start + 2 },
        ]
    }

    /// Apply the commit as one batch and return the inserted token
    pub fn apply<H: DocumentHost>(
        &self,
        host: &mut H,
        span: TriggerSpan,
        caret: usize,
        candidate: &Candidate,
    ) -> Result<EmbedToken, H::Error> {
        let token = candidate.to_token();
        let edits = self.plan(span, caret, token.clone());
        host.apply_edits(&edits)?;

        tracing::debug!(
            start_offset = span.start_offset,
            caret,
            value = %token.value,
            "committed hashtag"
        );

        Ok(token)
    }
}
