//! Folding frames into one answer.

use rc_domain::{StreamFrame, Turn};

/// What changed after a frame was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    /// The text buffer grew; the live view should re-render.
    Text,
    /// The context chunk list was replaced.  Text is unchanged.
    Context,
}

/// The result of one finished exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalAnswer {
    pub content: String,
    pub context_chunks: Vec<String>,
}

impl FinalAnswer {
    pub fn into_turn(self) -> Turn {
        Turn::assistant(self.content, self.context_chunks)
    }
}

/// Transient accumulation state for exactly one in-flight exchange.
#[derive(Debug, Default)]
pub struct Accumulator {
    text: String,
    context_chunks: Vec<String>,
    context_frames: usize,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one frame in arrival order.
    ///
    /// Text is appended.  A context frame replaces the previous chunk list
    /// wholesale; chunks from earlier frames are not merged.
    pub fn on_fragment(&mut self, frame: StreamFrame) -> Update {
        match frame {
            StreamFrame::TextDelta { text } => {
                self.text.push_str(&text);
                Update::Text
            }
            StreamFrame::Context { chunks } => {
                self.context_frames += 1;
                if self.context_frames > 1 {
                    tracing::debug!(
                        frames = self.context_frames,
                        "context frame replaces earlier chunks"
                    );
                }
                self.context_chunks = chunks;
                Update::Context
            }
        }
    }

    /// Text received so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Chunks from the most recent context frame.
    pub fn context_chunks(&self) -> &[String] {
        &self.context_chunks
    }

    /// Number of context frames seen.
    pub fn context_frames(&self) -> usize {
        self.context_frames
    }

    /// Take the accumulated answer, leaving the accumulator empty.
    pub fn finalize(&mut self) -> FinalAnswer {
        self.context_frames = 0;
        FinalAnswer {
            content: std::mem::take(&mut self.text),
            context_chunks: std::mem::take(&mut self.context_chunks),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_appends_and_signals_render() {
        let mut acc = Accumulator::new();
        assert_eq!(acc.on_fragment(StreamFrame::text("第一")), Update::Text);
        assert_eq!(acc.on_fragment(StreamFrame::text("部分")), Update::Text);
        assert_eq!(acc.text(), "第一部分");
    }

    #[test]
    fn context_does_not_touch_text() {
        let mut acc = Accumulator::new();
        acc.on_fragment(StreamFrame::text("a"));
        assert_eq!(
            acc.on_fragment(StreamFrame::context(vec!["X".into()])),
            Update::Context
        );
        assert_eq!(acc.text(), "a");
        assert_eq!(acc.context_chunks(), ["X"]);
    }

    #[test]
    fn last_context_frame_wins() {
        let mut acc = Accumulator::new();
        acc.on_fragment(StreamFrame::context(vec!["A".into(), "B".into()]));
        acc.on_fragment(StreamFrame::context(vec!["C".into()]));
        assert_eq!(acc.context_frames(), 2);
        assert_eq!(acc.finalize().context_chunks, vec!["C".to_string()]);
    }

    #[test]
    fn finalize_clears_state() {
        let mut acc = Accumulator::new();
        acc.on_fragment(StreamFrame::text("x"));
        acc.on_fragment(StreamFrame::context(vec!["c".into()]));
        let answer = acc.finalize();
        assert_eq!(answer.content, "x");
        assert_eq!(acc.text(), "");
        assert!(acc.context_chunks().is_empty());
        assert_eq!(acc.context_frames(), 0);
    }

    #[test]
    fn into_turn_without_chunks_has_no_context() {
        let turn = FinalAnswer { content: "plain".into(), context_chunks: Vec::new() }.into_turn();
        assert!(turn.context_chunks().is_none());
    }
}
