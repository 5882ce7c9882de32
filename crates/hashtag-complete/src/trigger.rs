//! Trigger detection
//!
//! On every caret-affecting event the detector scans at most `max_chars`
//! characters before the caret for the last trigger character, validates the
//! query typed after it, and tracks the completion state:
//!
//! ```text
//! Closed ──valid context──▶ AwaitingCandidates ──matching response──▶ Open
//!   ▲                              ▲                                   │
//!   │                              └────────caret moved, still valid───┘
//!   └──── caret lost / range selection / invalid query / hide ─────────
//! ```
//!
//! Every dispatched query gets a fresh generation number. A response is only
//! accepted for the latest generation while its trigger context is active.

use regex::Regex;

use crate::config::CompiledConfig;
use crate::host::{DocumentHost, OBJECT_REPLACEMENT};
use crate::source::{QueryRequest, QueryTicket};
use crate::types::TriggerSpan;

/// Completion lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionState {
    #[default]
    Closed,
    AwaitingCandidates,
    Open,
}

/// Why no completion context is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InactiveReason {
    NoCaret,
    RangeSelection,
    NoTrigger,
    Whitespace,
    /// An embedded token sits between the trigger and the caret
    EmbeddedObject,
    TooShort,
    DisallowedCharacters,
}

/// A validated trigger context found before the caret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerMatch {
    pub span: TriggerSpan,
    pub query: String,
    pub caret_offset: usize,
}

/// Result of scanning the text before the caret
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    Active(TriggerMatch),
    Inactive(InactiveReason),
}

impl Detection {
    pub fn is_active(&self) -> bool {
        matches!(self, Detection::Active(_))
    }
}

/// The context currently being completed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveContext {
    pub span: TriggerSpan,
    pub query: String,
    pub caret_offset: usize,
    pub generation: u64,
}

/// What the session should do after a detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// A new or changed context; send the request to the candidate source
    Dispatch(QueryRequest),
    /// No context; hide the list
    Close(InactiveReason),
    /// Same context as before; nothing to do
    Unchanged,
}

/// Scans for trigger contexts and owns the completion state machine
#[derive(Debug, Clone)]
pub struct TriggerDetector {
    trigger_char: char,
    allowed_chars: Option<Regex>,
    min_chars: usize,
    max_chars: usize,
    state: CompletionState,
    active: Option<ActiveContext>,
    generation: u64,
}

impl TriggerDetector {
    pub fn new(config: &CompiledConfig) -> Self {
        Self {
            trigger_char: config.trigger_char,
            allowed_chars: config.allowed_chars.clone(),
            min_chars: config.min_chars,
            max_chars: config.max_chars,
            state: CompletionState::Closed,
            active: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> CompletionState {
        self.state
    }

    pub fn active(&self) -> Option<&ActiveContext> {
        self.active.as_ref()
    }

    pub fn active_span(&self) -> Option<TriggerSpan> {
        self.active.as_ref().map(|ctx| ctx.span)
    }

    /// Generation of the most recently dispatched query
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// First offset of the scan window for a caret
    pub fn window_start(&self, caret: usize) -> usize {
        caret.saturating_sub(self.max_chars)
    }

    /// Scan a window of text that ends at `caret`
    pub fn scan(&self, caret: usize, window: &str) -> Detection {
        let mut chars: Vec<char> = window.chars().collect();
        if chars.len() > self.max_chars {
            chars.drain(..chars.len() - self.max_chars);
        }

        let Some(index) = chars.iter().rposition(|&c| c == self.trigger_char) else {
            return Detection::Inactive(InactiveReason::NoTrigger);
        };

        let start_offset = caret.saturating_sub(chars.len() - index);
        let query = &chars[index + 1..];

        if query.iter().any(|c| c.is_whitespace()) {
            return Detection::Inactive(InactiveReason::Whitespace);
        }

        if query.contains(&OBJECT_REPLACEMENT) {
            return Detection::Inactive(InactiveReason::EmbeddedObject);
        }

        if query.len() < self.min_chars {
            return Detection::Inactive(InactiveReason::TooShort);
        }

        if let Some(pattern) = &self.allowed_chars {
            let mut buf = [0u8; 4];
            if !query
                .iter()
                .all(|c| pattern.is_match(c.encode_utf8(&mut buf)))
            {
                return Detection::Inactive(InactiveReason::DisallowedCharacters);
            }
        }

        Detection::Active(TriggerMatch {
            span: TriggerSpan {
                start_offset,
                trigger_char: self.trigger_char,
            },
            query: query.iter().collect(),
            caret_offset: caret,
        })
    }

    /// Read the window before the host's caret and scan it
    pub fn detect<H: DocumentHost>(&self, host: &H) -> Result<Detection, H::Error> {
        self.detect_with_insert(host, "")
    }

    /// Scan as if `pending` had already been typed at the caret
    ///
    /// Used for keys whose text is inserted after their handler runs.
    pub fn detect_with_insert<H: DocumentHost>(
        &self,
        host: &H,
        pending: &str,
    ) -> Result<Detection, H::Error> {
        if matches!(host.selection(), Some(range) if !range.is_caret()) {
            return Ok(Detection::Inactive(InactiveReason::RangeSelection));
        }

        let Some(caret) = host.caret_offset() else {
            return Ok(Detection::Inactive(InactiveReason::NoCaret));
        };

        let start = self.window_start(caret);
        let mut window = host.plain_text(start, caret - start)?;
        window.push_str(pending);

        Ok(self.scan(caret + pending.chars().count(), &window))
    }

    /// Advance the state machine with a detection
    pub fn transition(&mut self, detection: Detection) -> Transition {
        match detection {
            Detection::Inactive(reason) => {
                if self.state != CompletionState::Closed {
                    tracing::debug!(?reason, "trigger context closed");
                }
                self.reset();
                Transition::Close(reason)
            }
            Detection::Active(found) => {
                if self.state != CompletionState::Closed {
                    if let Some(ctx) = &self.active {
                        if ctx.span == found.span
                            && ctx.query == found.query
                            && ctx.caret_offset == found.caret_offset
                        {
                            return Transition::Unchanged;
                        }
                    }
                }

                self.generation += 1;
                let ticket = QueryTicket {
                    generation: self.generation,
                    start_offset: found.span.start_offset,
                };

                tracing::debug!(
                    generation = self.generation,
                    start_offset = found.span.start_offset,
                    query = %found.query,
                    "trigger context detected"
                );

                self.active = Some(ActiveContext {
                    span: found.span,
                    query: found.query.clone(),
                    caret_offset: found.caret_offset,
                    generation: self.generation,
                });
                self.state = CompletionState::AwaitingCandidates;

                Transition::Dispatch(QueryRequest {
                    ticket,
                    query: found.query,
                })
            }
        }
    }

    /// Whether a response for `ticket` would still apply
    pub fn is_current(&self, ticket: &QueryTicket) -> bool {
        self.state != CompletionState::Closed
            && matches!(
                &self.active,
                Some(ctx) if ctx.generation == ticket.generation
                    && ctx.span.start_offset == ticket.start_offset
            )
    }

    /// Accept a response if it belongs to the current context
    pub fn resolve(&mut self, ticket: &QueryTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.state = CompletionState::Open;
        true
    }

    /// Drop the active context and return to `Closed`
    pub fn reset(&mut self) {
        self.state = CompletionState::Closed;
        self.active = None;
    }
}
