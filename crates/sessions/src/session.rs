//! One open chat view: transcript, knowledge-base selection, submission
//! gate, and the single in-flight exchange.
//!
//! Everything here is driven from one task.  The exchange itself streams
//! on a spawned task (see [`crate::exchange`]) and only hands frames back;
//! the transcript and the accumulation state are mutated here alone.

use std::sync::Arc;
use std::time::Instant;

use rc_backend::{QaBackend, QaRequest};
use rc_domain::config::{ChatConfig, FramingMode};
use rc_domain::error::{Error, Result};
use rc_domain::trace::TraceEvent;
use rc_domain::{Role, Turn};
use rc_stream::{Accumulator, Update};
use tokio::sync::OwnedSemaphorePermit;
use uuid::Uuid;

use crate::cancel::CancelToken;
use crate::citation::numbered;
use crate::exchange::{spawn_exchange, ExchangeEvent, ExchangeHandle};
use crate::lock::ExchangeLock;
use crate::lookup::ContextView;
use crate::transcript::Transcript;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// View types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Whether a query may be submitted right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Open,
    /// An exchange is already in flight.
    Busy,
    /// No knowledge base is selected (or none exist).
    NoKnowledgeBase,
    /// The query is empty or whitespace.
    EmptyQuery,
}

impl Gate {
    pub fn is_open(&self) -> bool {
        matches!(self, Gate::Open)
    }

    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Gate::Open => None,
            Gate::Busy => Some("an answer is still streaming"),
            Gate::NoKnowledgeBase => Some("no knowledge base available"),
            Gate::EmptyQuery => Some("query is empty"),
        }
    }
}

/// Result of applying one exchange event.
#[derive(Debug)]
pub enum Step {
    /// Live text grew.
    Text,
    /// Live context chunks were replaced.
    Context,
    /// The assistant turn was appended to the transcript.
    Finished,
    /// The exchange failed; no assistant turn was appended.
    Failed(Error),
    /// The exchange was cancelled; no assistant turn was appended.
    Cancelled,
    /// No exchange is in flight; the event was dropped.
    Ignored,
}

/// The in-progress answer, shown as the transcript tail while streaming.
#[derive(Debug, Clone, Copy)]
pub struct LiveTail<'a> {
    pub text: &'a str,
    pub context_chunks: &'a [String],
}

impl LiveTail<'_> {
    /// Live text with citation placeholders numbered.
    pub fn rendered(&self) -> String {
        numbered(self.text)
    }
}

/// One row of the rendered conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayTurn {
    /// Position in the transcript; `None` for the live tail.
    pub index: Option<usize>,
    pub role: Role,
    /// Content with citations numbered.
    pub content: String,
    /// Whether the context detail view can be opened for this row.
    pub has_context: bool,
    pub pending: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Per-exchange state.  Dropping it releases the exchange lock.
struct InFlight {
    id: Uuid,
    acc: Accumulator,
    token: CancelToken,
    knowledge_base: String,
    started: Instant,
    _permit: OwnedSemaphorePermit,
}

pub struct ChatSession {
    backend: Arc<dyn QaBackend>,
    framing: FramingMode,
    transcript: Transcript,
    knowledge_bases: Vec<String>,
    selected_kb: Option<String>,
    lock: ExchangeLock,
    in_flight: Option<InFlight>,
    context_view: ContextView,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn QaBackend>, chat: &ChatConfig) -> Self {
        Self {
            backend,
            framing: chat.framing,
            transcript: Transcript::with_system_prompt(&chat.system_prompt),
            knowledge_bases: Vec::new(),
            selected_kb: None,
            lock: ExchangeLock::new(),
            in_flight: None,
            context_view: ContextView::new(),
        }
    }

    // ── Knowledge bases ───────────────────────────────────────────────

    /// Fetch the directory once and select its first entry.
    pub async fn load_knowledge_bases(&mut self) -> Result<&[String]> {
        let names = self.backend.knowledge_bases().await?;
        self.set_knowledge_bases(names);
        Ok(&self.knowledge_bases)
    }

    /// Replace the selectable set; the first entry becomes the selection.
    pub fn set_knowledge_bases(&mut self, names: Vec<String>) {
        self.selected_kb = names.first().cloned();
        self.knowledge_bases = names;

        TraceEvent::KnowledgeBasesLoaded {
            count: self.knowledge_bases.len(),
            selected: self.selected_kb.clone(),
        }
        .emit();
    }

    pub fn knowledge_bases(&self) -> &[String] {
        &self.knowledge_bases
    }

    pub fn selected_knowledge_base(&self) -> Option<&str> {
        self.selected_kb.as_deref()
    }

    /// Switch knowledge base.  Not allowed while an answer is streaming.
    pub fn select_knowledge_base(&mut self, name: &str) -> Result<()> {
        if self.is_busy() {
            return Err(Error::SessionBusy);
        }
        if !self.knowledge_bases.iter().any(|kb| kb == name) {
            return Err(Error::Other(format!("unknown knowledge base: {name}")));
        }
        self.selected_kb = Some(name.to_owned());
        Ok(())
    }

    // ── Submission ────────────────────────────────────────────────────

    pub fn gate(&self, query: &str) -> Gate {
        if self.is_busy() {
            Gate::Busy
        } else if self.selected_kb.is_none() {
            Gate::NoKnowledgeBase
        } else if query.trim().is_empty() {
            Gate::EmptyQuery
        } else {
            Gate::Open
        }
    }

    pub fn can_submit(&self, query: &str) -> bool {
        self.gate(query).is_open()
    }

    /// Append the user turn and start streaming the answer.
    ///
    /// The user turn is part of the transcript as soon as this returns,
    /// whatever happens to the exchange afterwards.
    pub fn submit(&mut self, query: &str) -> Result<ExchangeHandle> {
        let gate = self.gate(query);
        let knowledge_base = match (gate, self.selected_kb.clone()) {
            (Gate::Open, Some(kb)) => kb,
            (Gate::Busy, _) => return Err(Error::SessionBusy),
            (other, _) => {
                return Err(Error::SubmissionBlocked(
                    other.reason().unwrap_or("blocked").to_owned(),
                ))
            }
        };
        let permit = self.lock.try_acquire()?;

        self.transcript.append(Turn::user(query));
        let request = QaRequest {
            messages: self.transcript.all().to_vec(),
            knowledge_base_name: knowledge_base.clone(),
        };

        let token = CancelToken::new();
        let handle = spawn_exchange(self.backend.clone(), request, self.framing, token.clone());

        TraceEvent::ExchangeStarted {
            exchange_id: handle.id().to_string(),
            knowledge_base: knowledge_base.clone(),
            history_turns: self.transcript.len(),
        }
        .emit();

        self.in_flight = Some(InFlight {
            id: handle.id(),
            acc: Accumulator::new(),
            token,
            knowledge_base,
            started: Instant::now(),
            _permit: permit,
        });
        Ok(handle)
    }

    /// Fold one event from exchange `exchange_id` into the session.
    ///
    /// Events from any exchange other than the one in flight (an aborted
    /// one, say) are dropped without touching the current exchange.
    pub fn apply(&mut self, exchange_id: Uuid, event: ExchangeEvent) -> Step {
        let Some(flight) = self.in_flight.as_mut().filter(|f| f.id == exchange_id) else {
            tracing::debug!(%exchange_id, ?event, "event for an exchange not in flight");
            return Step::Ignored;
        };

        match event {
            ExchangeEvent::Frame(frame) => match flight.acc.on_fragment(frame) {
                Update::Text => Step::Text,
                Update::Context => {
                    TraceEvent::ContextReceived {
                        exchange_id: flight.id.to_string(),
                        chunks: flight.acc.context_chunks().len(),
                    }
                    .emit();
                    Step::Context
                }
            },
            ExchangeEvent::Completed => {
                let Some(mut flight) = self.in_flight.take() else {
                    return Step::Ignored;
                };
                let answer = flight.acc.finalize();
                TraceEvent::ExchangeFinished {
                    exchange_id: flight.id.to_string(),
                    content_chars: answer.content.chars().count(),
                    context_chunks: answer.context_chunks.len(),
                    duration_ms: flight.started.elapsed().as_millis() as u64,
                }
                .emit();
                tracing::debug!(knowledge_base = %flight.knowledge_base, "answer complete");
                self.transcript.append(answer.into_turn());
                Step::Finished
            }
            ExchangeEvent::Failed(e) => {
                if let Some(flight) = self.in_flight.take() {
                    TraceEvent::ExchangeFailed {
                        exchange_id: flight.id.to_string(),
                        error: e.to_string(),
                    }
                    .emit();
                }
                Step::Failed(e)
            }
            ExchangeEvent::Cancelled => {
                if let Some(flight) = self.in_flight.take() {
                    TraceEvent::ExchangeCancelled {
                        exchange_id: flight.id.to_string(),
                    }
                    .emit();
                }
                Step::Cancelled
            }
        }
    }

    /// Consume `handle` to the end, calling `on_step` after every event.
    ///
    /// Returns `Ok` once the assistant turn is appended, otherwise the
    /// failure (`Error::Cancelled` for a cancelled exchange).
    pub async fn drive<F>(&mut self, handle: &mut ExchangeHandle, mut on_step: F) -> Result<()>
    where
        F: FnMut(&ChatSession, &Step),
    {
        if self.in_flight.as_ref().map(|f| f.id) != Some(handle.id()) {
            return Err(Error::Other("exchange is not in flight for this session".into()));
        }

        loop {
            let event = match handle.next_event().await {
                Some(event) => event,
                None => ExchangeEvent::Failed(Error::Other(
                    "exchange task ended without a result".into(),
                )),
            };

            let step = self.apply(handle.id(), event);
            on_step(self, &step);
            match step {
                Step::Finished => return Ok(()),
                Step::Failed(e) => return Err(e),
                Step::Cancelled => return Err(Error::Cancelled),
                Step::Ignored => {
                    return Err(Error::Other("exchange is no longer in flight".into()))
                }
                Step::Text | Step::Context => {}
            }
        }
    }

    /// Ask the in-flight exchange to stop.  Returns `false` when idle.
    pub fn cancel(&self) -> bool {
        match &self.in_flight {
            Some(flight) => {
                flight.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel and discard the in-flight exchange without waiting for its
    /// terminal event.  For when its handle is no longer being driven.
    pub fn abort(&mut self) -> bool {
        let Some(id) = self.in_flight.as_ref().map(|f| f.id) else {
            return false;
        };
        self.cancel();
        self.apply(id, ExchangeEvent::Cancelled);
        true
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    // ── Rendering ─────────────────────────────────────────────────────

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// The partial answer of the in-flight exchange.
    pub fn live(&self) -> Option<LiveTail<'_>> {
        self.in_flight.as_ref().map(|flight| LiveTail {
            text: flight.acc.text(),
            context_chunks: flight.acc.context_chunks(),
        })
    }

    /// Non-system turns followed by the live tail, citations numbered.
    pub fn view(&self) -> Vec<DisplayTurn> {
        let mut rows: Vec<DisplayTurn> = self
            .transcript
            .all()
            .iter()
            .enumerate()
            .filter(|(_, turn)| turn.role() != Role::System)
            .map(|(i, turn)| DisplayTurn {
                index: Some(i),
                role: turn.role(),
                content: numbered(turn.content()),
                has_context: turn.has_context(),
                pending: false,
            })
            .collect();

        if let Some(live) = self.live() {
            rows.push(DisplayTurn {
                index: None,
                role: Role::Assistant,
                content: live.rendered(),
                has_context: !live.context_chunks.is_empty(),
                pending: true,
            });
        }
        rows
    }

    // ── Context lookup ────────────────────────────────────────────────

    /// Open the detail view on the turn at `index`.
    pub fn open_context(&mut self, index: usize) -> bool {
        match self.transcript.get(index) {
            Some(turn) => self.context_view.open_turn(turn),
            None => false,
        }
    }

    /// Open the detail view on the latest assistant turn.  Stays closed
    /// when that turn has no context.
    pub fn open_latest_context(&mut self) -> bool {
        match self.transcript.last_assistant() {
            Some(index) => self.open_context(index),
            None => false,
        }
    }

    /// Open the detail view on the chunks received so far by the
    /// in-flight exchange.
    pub fn open_live_context(&mut self) -> bool {
        match &self.in_flight {
            Some(flight) => self.context_view.open(flight.acc.context_chunks()),
            None => false,
        }
    }

    pub fn close_context(&mut self) {
        self.context_view.close();
    }

    pub fn context_view(&self) -> &ContextView {
        &self.context_view
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        // The view is going away: stop the exchange instead of letting it
        // stream into nothing.
        self.cancel();
    }
}
