/// Hashtag Completion Engine
///
/// In-document autocomplete for rich-text editors. While the user types, the
/// engine watches for a trigger character, asks a candidate source for
/// completions of the text after it, shows a keyboard-navigable list anchored
/// below the trigger, and on selection replaces trigger and query with one
/// atomic embedded token.
///
/// # Core Components
///
/// ## TriggerDetector
/// Scans a bounded window before the caret for the last trigger character,
/// validates the query, and runs the completion state machine
/// (`Closed`, `AwaitingCandidates`, `Open`).
///
/// ## SuggestionListController
/// Owns the candidate set and highlighted index and drives a `RenderTarget`.
/// An empty result is shown as a single raw-query candidate.
///
/// ## PositionEngine
/// Places the panel below the trigger, flipping above it or pulling it left
/// when it would leave the viewport.
///
/// ## KeyBindingRouter
/// Claims select, dismiss and navigation keys ahead of the host's own
/// bindings while the list is open.
///
/// ## SelectionCommitter
/// Deletes the trigger and query, inserts the embed token and a space, and
/// moves the caret past them, as one batch of `DocumentEdit`s.
///
/// ## HashtagSession
/// Wires the components together for one editor instance.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use hashtag_complete::*;
///
/// let source = Arc::new(StaticCandidateSource::from_values(["world", "work"]));
/// let mut session = HashtagSession::new(&CompiledConfig::default(), source, HeadlessTarget::default());
/// let mut doc = MemoryDocument::new("hello #wor");
///
/// if let Some(request) = session.on_text_changed(&doc, ChangeSource::User)? {
///     let response = session.resolve(request).await;
///     session.apply_response(&doc, response)?;
/// }
/// session.commit(&mut doc)?;
/// ```
pub mod commit;
pub mod config;
pub mod error;
pub mod host;
pub mod list;
pub mod position;
pub mod router;
pub mod session;
pub mod source;
pub mod trigger;
pub mod types;

pub use commit::SelectionCommitter;
pub use config::{
    CompiledConfig, CompiledKeys, ConfigFormat, ConfigLoader, HashtagConfig, KeyConfig,
};
pub use error::{ConfigError, ConfigResult, SourceError};
pub use host::{DocumentEdit, DocumentHost, MemoryDocument, MemoryDocumentError, Node, OBJECT_REPLACEMENT};
pub use list::{
    default_item_renderer, HeadlessTarget, ItemRenderer, RenderCall, RenderTarget,
    SuggestionListController, SuggestionListState, SuggestionRow, Visibility,
};
pub use position::{Anchor, PanelPosition, PanelSize, PlacementOffsets, PositionEngine, Rect, Viewport};
pub use router::{KeyBindingRouter, Route, RouterAction};
pub use session::HashtagSession;
pub use source::{
    spawn_query, CandidateSource, FnCandidateSource, QueryRequest, QueryResponse, QueryTicket,
    StaticCandidateSource,
};
pub use trigger::{
    ActiveContext, CompletionState, Detection, InactiveReason, Transition, TriggerDetector,
    TriggerMatch,
};
pub use types::{Candidate, ChangeSource, EmbedToken, SelectionRange, TriggerSpan, EMBED_KIND};
