//! Suggestion list controller
//!
//! Owns the candidate set and highlighted index, and drives a [`RenderTarget`]
//! through the reveal sequence: rows, highlight, measure while invisible,
//! position, show. Any UI toolkit can back the target.

use std::fmt;
use std::sync::Arc;

use crate::position::{Anchor, PanelPosition, PanelSize, PositionEngine};
use crate::types::Candidate;

/// Produces the display label for a candidate given the current query
pub type ItemRenderer = Arc<dyn Fn(&Candidate, &str) -> String + Send + Sync>;

/// Default renderer: the candidate's value
pub fn default_item_renderer() -> ItemRenderer {
    Arc::new(|candidate: &Candidate, _query: &str| candidate.value.clone())
}

/// One visual row, carrying what a click handler needs to find its candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRow {
    pub index: usize,
    pub id: Option<String>,
    pub value: String,
    pub label: String,
}

/// Panel visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Hidden,
    /// Laid out for measurement but not visible
    Measuring,
    Shown,
}

/// Surface the list is drawn on
pub trait RenderTarget {
    /// Replace all rows
    fn set_rows(&mut self, rows: &[SuggestionRow]);

    /// Mark one row highlighted and scroll it into view
    fn highlight_row(&mut self, index: usize);

    /// Natural size of the panel with its current rows
    fn measure(&self) -> PanelSize;

    fn set_position(&mut self, position: PanelPosition);

    fn set_visibility(&mut self, visibility: Visibility);
}

/// Candidates, highlight and open flag
///
/// While open, `candidates` is non-empty and `highlighted_index` is in range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestionListState {
    pub candidates: Vec<Candidate>,
    pub highlighted_index: usize,
    pub is_open: bool,
}

/// Drives a [`RenderTarget`] from the current candidate set
pub struct SuggestionListController<R> {
    state: SuggestionListState,
    target: R,
    engine: PositionEngine,
    renderer: ItemRenderer,
}

impl<R: fmt::Debug> fmt::Debug for SuggestionListController<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuggestionListController")
            .field("state", &self.state)
            .field("target", &self.target)
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl<R: RenderTarget> SuggestionListController<R> {
    pub fn new(target: R, engine: PositionEngine) -> Self {
        Self {
            state: SuggestionListState::default(),
            target,
            engine,
            renderer: default_item_renderer(),
        }
    }

    pub fn with_item_renderer(mut self, renderer: ItemRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn set_item_renderer(&mut self, renderer: ItemRenderer) {
        self.renderer = renderer;
    }

    pub fn state(&self) -> &SuggestionListState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.state.candidates
    }

    pub fn highlighted_index(&self) -> usize {
        self.state.highlighted_index
    }

    pub fn target(&self) -> &R {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut R {
        &mut self.target
    }

    /// Show `candidates` for `query`, anchored at the trigger
    ///
    /// An empty result is replaced by a single raw candidate holding the
    /// query, so the user can always complete with what they typed.
    pub fn render(
        &mut self,
        mut candidates: Vec<Candidate>,
        query: &str,
        anchor: &Anchor,
    ) -> PanelPosition {
        if candidates.is_empty() {
            candidates.push(Candidate::raw(query));
        }

        let rows: Vec<SuggestionRow> = candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| SuggestionRow {
                index,
                id: candidate.id.clone(),
                value: candidate.value.clone(),
                label: (self.renderer)(candidate, query),
            })
            .collect();

        tracing::debug!(count = rows.len(), query, "rendering suggestion list");

        self.state.candidates = candidates;
        self.state.highlighted_index = 0;
        self.target.set_rows(&rows);
        self.target.highlight_row(0);
        self.reveal(anchor)
    }

    /// Show the current candidates again; returns `None` if there are none
    pub fn open(&mut self, anchor: &Anchor) -> Option<PanelPosition> {
        if self.state.candidates.is_empty() {
            return None;
        }
        if self.state.highlighted_index >= self.state.candidates.len() {
            self.state.highlighted_index = 0;
        }
        self.target.highlight_row(self.state.highlighted_index);
        Some(self.reveal(anchor))
    }

    /// Recompute the panel position while open
    pub fn reposition(&mut self, anchor: &Anchor) -> Option<PanelPosition> {
        if !self.state.is_open {
            return None;
        }
        let position = self.engine.position(anchor, self.target.measure());
        self.target.set_position(position);
        Some(position)
    }

    /// Hide the panel; does nothing when already closed
    pub fn close(&mut self) {
        if !self.state.is_open {
            return;
        }
        self.state.is_open = false;
        self.target.set_visibility(Visibility::Hidden);
        tracing::debug!("suggestion list closed");
    }

    pub fn next(&mut self) {
        if !self.state.is_open || self.state.candidates.is_empty() {
            return;
        }
        let len = self.state.candidates.len();
        self.move_highlight((self.state.highlighted_index + 1) % len);
    }

    pub fn previous(&mut self) {
        if !self.state.is_open || self.state.candidates.is_empty() {
            return;
        }
        let len = self.state.candidates.len();
        self.move_highlight((self.state.highlighted_index + len - 1) % len);
    }

    /// Highlight a specific row, e.g. the one under the pointer
    pub fn select(&mut self, index: usize) -> Option<&Candidate> {
        if !self.state.is_open || index >= self.state.candidates.len() {
            return None;
        }
        self.move_highlight(index);
        self.state.candidates.get(index)
    }

    /// The highlighted candidate, or `None` when closed
    pub fn current_selection(&self) -> Option<&Candidate> {
        if !self.state.is_open {
            return None;
        }
        self.state.candidates.get(self.state.highlighted_index)
    }

    fn move_highlight(&mut self, index: usize) {
        self.state.highlighted_index = index;
        self.target.highlight_row(index);
        tracing::trace!(index, "highlight moved");
    }

    fn reveal(&mut self, anchor: &Anchor) -> PanelPosition {
        self.target.set_visibility(Visibility::Measuring);
        let position = self.engine.position(anchor, self.target.measure());
        self.target.set_position(position);
        self.target.set_visibility(Visibility::Shown);
        self.state.is_open = true;
        position
    }
}

/// A call received by a [`HeadlessTarget`]
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    SetRows(usize),
    Highlight(usize),
    Measure,
    SetPosition(PanelPosition),
    SetVisibility(Visibility),
}

/// Render target without a UI; keeps the last rendered state
///
/// Rows have a fixed height and the panel is as wide as its longest label.
#[derive(Debug, Clone)]
pub struct HeadlessTarget {
    pub rows: Vec<SuggestionRow>,
    pub highlighted: Option<usize>,
    pub position: Option<PanelPosition>,
    pub visibility: Visibility,
    pub scroll_top: f64,
    pub row_height: f64,
    pub char_width: f64,
    calls: Vec<RenderCall>,
}

impl Default for HeadlessTarget {
    fn default() -> Self {
        Self::new(8.0, 20.0)
    }
}

impl HeadlessTarget {
    pub fn new(char_width: f64, row_height: f64) -> Self {
        Self {
            rows: Vec::new(),
            highlighted: None,
            position: None,
            visibility: Visibility::Hidden,
            scroll_top: 0.0,
            row_height,
            char_width,
            calls: Vec::new(),
        }
    }

    /// Labels of the current rows
    pub fn labels(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.label.as_str()).collect()
    }

    pub fn calls(&self) -> &[RenderCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl RenderTarget for HeadlessTarget {
    fn set_rows(&mut self, rows: &[SuggestionRow]) {
        self.rows = rows.to_vec();
        self.highlighted = None;
        self.scroll_top = 0.0;
        self.calls.push(RenderCall::SetRows(rows.len()));
    }

    fn highlight_row(&mut self, index: usize) {
        self.highlighted = Some(index);
        self.scroll_top = index as f64 * self.row_height;
        self.calls.push(RenderCall::Highlight(index));
    }

    fn measure(&self) -> PanelSize {
        let widest = self
            .rows
            .iter()
            .map(|row| row.label.chars().count())
            .max()
            .unwrap_or(0);
        PanelSize::new(
            widest as f64 * self.char_width,
            self.rows.len() as f64 * self.row_height,
        )
    }

    fn set_position(&mut self, position: PanelPosition) {
        self.position = Some(position);
        self.calls.push(RenderCall::SetPosition(position));
    }

    fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
        self.calls.push(RenderCall::SetVisibility(visibility));
    }
}
