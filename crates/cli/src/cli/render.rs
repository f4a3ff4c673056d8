//! Terminal and JSON rendering shared by `chat` and `ask`.

use rc_sessions::citation::{numbered_with_citations, resolve};
use rc_sessions::{ContextView, DisplayTurn};
use serde::Serialize;

/// Prints a growing rendered answer without repeating what is already on
/// screen.
///
/// Numbering only inserts digits inside complete `[]` pairs, so the
/// rendering of a prefix is always a prefix of the rendering of the
/// whole.  Printing the unseen suffix is therefore enough.
#[derive(Debug, Default)]
pub struct StreamPrinter {
    printed: usize,
}

impl StreamPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The part of `rendered` not yet printed.
    pub fn advance<'a>(&mut self, rendered: &'a str) -> &'a str {
        let fresh = rendered.get(self.printed..).unwrap_or("");
        self.printed = rendered.len();
        fresh
    }
}

/// One line per selected chunk, or just `[index]` when given.
pub fn context_lines(view: &ContextView, index: Option<usize>) -> Vec<String> {
    match index {
        Some(i) => view
            .entry(i)
            .map(|e| vec![format!("{} {}", e.label(), e.text)])
            .unwrap_or_default(),
        None => view
            .entries()
            .iter()
            .map(|e| format!("{} {}", e.label(), e.text))
            .collect(),
    }
}

/// A transcript row as printed by `/history`.
pub fn history_line(row: &DisplayTurn) -> String {
    let position = row
        .index
        .map(|i| format!("#{i}"))
        .unwrap_or_else(|| "..".into());
    let mut line = format!("{position} {}: {}", row.role, row.content);
    if row.has_context {
        line.push_str("  (context)");
    }
    if row.pending {
        line.push_str("  (streaming)");
    }
    line
}

// ── JSON output ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct CitationOut {
    pub index: usize,
    /// `None` when the answer cites more chunks than were retrieved.
    pub chunk: Option<String>,
}

/// Result of `ragchat ask --json`.
#[derive(Debug, Clone, Serialize)]
pub struct AskOutput {
    pub knowledge_base: String,
    /// Answer with citations numbered.
    pub answer: String,
    pub context_chunks: Vec<String>,
    pub citations: Vec<CitationOut>,
}

impl AskOutput {
    /// Build from the raw answer as stored, placeholders unnumbered.
    pub fn new(knowledge_base: &str, raw_answer: &str, context_chunks: Vec<String>) -> Self {
        let (answer, assigned) = numbered_with_citations(raw_answer);
        let citations = resolve(&assigned, &context_chunks)
            .into_iter()
            .map(|(index, chunk)| CitationOut {
                index,
                chunk: chunk.map(str::to_owned),
            })
            .collect();
        Self {
            knowledge_base: knowledge_base.to_owned(),
            answer,
            context_chunks,
            citations,
        }
    }
}
