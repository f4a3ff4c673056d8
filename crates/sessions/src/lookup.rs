//! Context detail view.
//!
//! Opening the view copies a turn's chunk list into a transient selection;
//! closing clears it.  The transcript itself is never touched.

use rc_domain::Turn;

/// One chunk in the detail view, addressed by its citation index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextEntry<'a> {
    /// 1-based, matching the numbered `[n]` citation.
    pub index: usize,
    pub text: &'a str,
}

impl ContextEntry<'_> {
    pub fn label(&self) -> String {
        format!("[{}]", self.index)
    }
}

/// The currently selected context, if the detail view is open.
#[derive(Debug, Default, Clone)]
pub struct ContextView {
    selected: Option<Vec<String>>,
}

impl ContextView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the view on a chunk list.  An empty list leaves it closed.
    pub fn open(&mut self, chunks: &[String]) -> bool {
        if chunks.is_empty() {
            return false;
        }
        self.selected = Some(chunks.to_vec());
        true
    }

    /// Open the view on a turn's captured context.  Returns `false` (and
    /// stays closed) for turns without retrieved material.
    pub fn open_turn(&mut self, turn: &Turn) -> bool {
        match turn.context_chunks() {
            Some(chunks) => self.open(chunks),
            None => false,
        }
    }

    pub fn close(&mut self) {
        self.selected = None;
    }

    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    /// The chunk cited as `[index]`.
    pub fn entry(&self, index: usize) -> Option<ContextEntry<'_>> {
        let chunks = self.selected.as_ref()?;
        let text = chunks.get(index.checked_sub(1)?)?;
        Some(ContextEntry { index, text })
    }

    /// Every selected chunk in order.
    pub fn entries(&self) -> Vec<ContextEntry<'_>> {
        self.selected
            .iter()
            .flatten()
            .enumerate()
            .map(|(i, text)| ContextEntry { index: i + 1, text })
            .collect()
    }
}
