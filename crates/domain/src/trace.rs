use serde::Serialize;

/// Structured trace events emitted across all ragchat crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    KnowledgeBasesLoaded {
        count: usize,
        selected: Option<String>,
    },
    ExchangeStarted {
        exchange_id: String,
        knowledge_base: String,
        history_turns: usize,
    },
    ContextReceived {
        exchange_id: String,
        chunks: usize,
    },
    ExchangeFinished {
        exchange_id: String,
        content_chars: usize,
        context_chunks: usize,
        duration_ms: u64,
    },
    ExchangeFailed {
        exchange_id: String,
        error: String,
    },
    ExchangeCancelled {
        exchange_id: String,
    },
    TranscriptAppend {
        role: String,
        turns: usize,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "rc_event");
    }
}
