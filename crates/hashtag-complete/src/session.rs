//! Hashtag completion session
//!
//! One [`HashtagSession`] serves one editor. The host forwards its text,
//! selection, key and click events; the session answers with queries to run
//! and key dispositions, and applies candidate responses when they come back.
//!
//! All methods take the session by `&mut self` and are meant to be called
//! from the editor's own event loop. Candidate queries are the only async
//! part: run a returned [`QueryRequest`] with [`HashtagSession::spawn`] or
//! [`HashtagSession::resolve`] and hand the [`QueryResponse`] back to
//! [`HashtagSession::apply_response`].

use std::sync::Arc;

use hashtag_keybinds::{KeyCombo, KeyDisposition, Keybind, KeybindRegistry, RegistryError};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::commit::SelectionCommitter;
use crate::config::{CompiledConfig, HashtagConfig};
use crate::error::ConfigResult;
use crate::host::DocumentHost;
use crate::list::{ItemRenderer, RenderTarget, SuggestionListController};
use crate::position::{Anchor, PanelPosition, PositionEngine};
use crate::router::{KeyBindingRouter, Route, RouterAction};
use crate::source::{spawn_query, CandidateSource, QueryRequest, QueryResponse};
use crate::trigger::{CompletionState, Detection, Transition, TriggerDetector};
use crate::types::{ChangeSource, EmbedToken, SelectionRange, TriggerSpan};

/// Completion state for a single editor instance
pub struct HashtagSession<R> {
    detector: TriggerDetector,
    list: SuggestionListController<R>,
    committer: SelectionCommitter,
    router: KeyBindingRouter,
    source: Arc<dyn CandidateSource>,
}

impl<R: RenderTarget> HashtagSession<R> {
    pub fn new(config: &CompiledConfig, source: Arc<dyn CandidateSource>, target: R) -> Self {
        Self {
            detector: TriggerDetector::new(config),
            list: SuggestionListController::new(target, PositionEngine::new(config.offsets)),
            committer: SelectionCommitter::new(),
            router: KeyBindingRouter::new(&config.keys),
            source,
        }
    }

    /// Validate `config` and build a session from it
    pub fn from_config(
        config: &HashtagConfig,
        source: Arc<dyn CandidateSource>,
        target: R,
    ) -> ConfigResult<Self> {
        Ok(Self::new(&config.compile()?, source, target))
    }

    pub fn with_item_renderer(mut self, renderer: ItemRenderer) -> Self {
        self.list.set_item_renderer(renderer);
        self
    }

    /// Insert committed tokens with a different embed kind
    pub fn with_embed_kind(mut self, kind: &'static str) -> Self {
        self.committer = SelectionCommitter::with_kind(kind);
        self
    }

    pub fn state(&self) -> CompletionState {
        self.detector.state()
    }

    pub fn is_open(&self) -> bool {
        self.list.is_open()
    }

    pub fn active_span(&self) -> Option<TriggerSpan> {
        self.detector.active_span()
    }

    pub fn detector(&self) -> &TriggerDetector {
        &self.detector
    }

    pub fn list(&self) -> &SuggestionListController<R> {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut SuggestionListController<R> {
        &mut self.list
    }

    pub fn router(&self) -> &KeyBindingRouter {
        &self.router
    }

    pub fn source(&self) -> &Arc<dyn CandidateSource> {
        &self.source
    }

    /// Add this session's key bindings to the host's registry
    pub fn register_bindings(&self, registry: &mut KeybindRegistry) -> Result<(), RegistryError> {
        self.router.register(registry)
    }

    /// Handle a document text change
    ///
    /// Changes not made by the user are ignored. Returns a query to run when
    /// a new completion context starts.
    pub fn on_text_changed<H: DocumentHost>(
        &mut self,
        host: &H,
        source: ChangeSource,
    ) -> Result<Option<QueryRequest>, H::Error> {
        if !source.is_user() {
            tracing::trace!(?source, "ignoring non-user text change");
            return Ok(None);
        }
        self.refresh(host)
    }

    /// Handle a selection change; a lost or ranged selection closes the list
    pub fn on_selection_changed<H: DocumentHost>(
        &mut self,
        host: &H,
        selection: Option<SelectionRange>,
    ) -> Result<Option<QueryRequest>, H::Error> {
        match selection {
            Some(range) if range.is_caret() => self.refresh(host),
            _ => {
                self.hide();
                Ok(None)
            }
        }
    }

    /// Re-run detection at the host's caret
    pub fn refresh<H: DocumentHost>(&mut self, host: &H) -> Result<Option<QueryRequest>, H::Error> {
        let detection = self.detector.detect(host)?;
        Ok(self.apply_detection(detection))
    }

    fn apply_detection(&mut self, detection: Detection) -> Option<QueryRequest> {
        let previous = self.detector.active_span();
        match self.detector.transition(detection) {
            Transition::Dispatch(request) => {
                // The open list belongs to the previous trigger
                if previous.is_some_and(|span| span.start_offset != request.ticket.start_offset) {
                    self.list.close();
                }
                Some(request)
            }
            Transition::Close(_) => {
                self.list.close();
                None
            }
            Transition::Unchanged => None,
        }
    }

    /// Show the candidates from a query response
    ///
    /// Responses for a superseded or closed context are dropped and return
    /// `false`. A failed query shows the raw-query fallback.
    pub fn apply_response<H: DocumentHost>(
        &mut self,
        host: &H,
        response: QueryResponse,
    ) -> Result<bool, H::Error> {
        let QueryResponse {
            ticket,
            query,
            result,
        } = response;

        if !self.detector.is_current(&ticket) {
            tracing::debug!(
                generation = ticket.generation,
                latest = self.detector.generation(),
                start_offset = ticket.start_offset,
                "discarding stale candidate response"
            );
            return Ok(false);
        }

        let candidates = result.unwrap_or_else(|err| {
            tracing::warn!(error = %err, query = %query, "candidate source failed; using raw query");
            Vec::new()
        });

        let Some(span) = self.detector.active_span() else {
            return Ok(false);
        };
        let anchor = Self::anchor(host, span)?;

        self.list.render(candidates, &query, &anchor);
        self.detector.resolve(&ticket);
        Ok(true)
    }

    /// Route a key press
    ///
    /// [`KeyDisposition::Handled`] means the host must skip its default
    /// handling for the key.
    pub fn handle_key<H: DocumentHost>(
        &mut self,
        host: &mut H,
        key: &KeyCombo,
    ) -> Result<KeyDisposition, H::Error> {
        match self.router.action_for(key) {
            Some(action) => self.handle_action(host, action),
            None => Ok(KeyDisposition::Unhandled),
        }
    }

    /// Handle a binding dispatched by a [`KeybindRegistry`]
    ///
    /// Bindings that do not belong to this session are passed on.
    pub fn handle_keybind<H: DocumentHost>(
        &mut self,
        host: &mut H,
        keybind: &Keybind,
    ) -> Result<KeyDisposition, H::Error> {
        match RouterAction::from_action_id(&keybind.action_id) {
            Some(action) => self.handle_action(host, action),
            None => Ok(KeyDisposition::Unhandled),
        }
    }

    pub fn handle_action<H: DocumentHost>(
        &mut self,
        host: &mut H,
        action: RouterAction,
    ) -> Result<KeyDisposition, H::Error> {
        let route = self.router.route(action, self.list.is_open());
        tracing::trace!(?action, ?route, "routing key");

        match route {
            Route::Commit => {
                self.commit(host)?;
            }
            Route::Close => self.hide(),
            Route::Previous => self.list.previous(),
            Route::Next => self.list.next(),
            Route::Revalidate => self.revalidate_before_space(host)?,
            Route::PassThrough => {}
        }

        Ok(route.disposition())
    }

    /// A space is about to be inserted; close if it ends the query
    fn revalidate_before_space<H: DocumentHost>(&mut self, host: &H) -> Result<(), H::Error> {
        let detection = self.detector.detect_with_insert(host, " ")?;
        if !detection.is_active() {
            self.apply_detection(detection);
        }
        Ok(())
    }

    /// Highlight the clicked row and commit it
    pub fn click_row<H: DocumentHost>(
        &mut self,
        host: &mut H,
        index: usize,
    ) -> Result<Option<EmbedToken>, H::Error> {
        if self.list.select(index).is_none() {
            return Ok(None);
        }
        self.commit(host)
    }

    /// Replace the trigger and query with the highlighted candidate
    ///
    /// Does nothing and returns `None` unless the list is open over an
    /// active trigger context.
    pub fn commit<H: DocumentHost>(&mut self, host: &mut H) -> Result<Option<EmbedToken>, H::Error> {
        if !self.list.is_open() {
            return Ok(None);
        }
        let Some(context) = self.detector.active().cloned() else {
            tracing::debug!("commit without an active trigger context");
            return Ok(None);
        };
        let Some(candidate) = self.list.current_selection().cloned() else {
            return Ok(None);
        };

        let token = self
            .committer
            .apply(host, context.span, context.caret_offset, &candidate)?;

        self.list.close();
        self.detector.reset();
        Ok(Some(token))
    }

    /// Close the list and forget the current trigger context
    pub fn hide(&mut self) {
        self.list.close();
        self.detector.reset();
    }

    /// Place the open panel again, e.g. after a scroll or resize
    pub fn reposition<H: DocumentHost>(
        &mut self,
        host: &H,
    ) -> Result<Option<PanelPosition>, H::Error> {
        if !self.list.is_open() {
            return Ok(None);
        }
        let Some(span) = self.detector.active_span() else {
            return Ok(None);
        };
        let anchor = Self::anchor(host, span)?;
        Ok(self.list.reposition(&anchor))
    }

    /// Run a query on the tokio runtime, delivering the response on `responses`
    pub fn spawn(
        &self,
        request: QueryRequest,
        responses: UnboundedSender<QueryResponse>,
    ) -> JoinHandle<()> {
        spawn_query(Arc::clone(&self.source), request, responses)
    }

    /// Run a query and wait for its response
    pub async fn resolve(&self, request: QueryRequest) -> QueryResponse {
        request.resolve(self.source.as_ref()).await
    }

    fn anchor<H: DocumentHost>(host: &H, span: TriggerSpan) -> Result<Anchor, H::Error> {
        Ok(Anchor {
            container: host.container_rect(),
            trigger: host.bounds_for_offset(span.start_offset)?,
            viewport: host.viewport(),
        })
    }
}
