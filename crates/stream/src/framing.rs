//! Splitting decoded text into frames.
//!
//! Two strategies, selected by [`FramingMode`]:
//!
//! - **Sniff**: every decoded fragment goes through [`classify`] on its own.
//!   No buffering; a frame split across reads degrades to text.
//! - **Delimited**: `data: ` at the start of the stream or of a line opens a
//!   control frame that ends at the next blank line (`\n\n`).  Only those
//!   segments are parsed.  Text is emitted as soon as it cannot be the start
//!   of a marker.

use rc_domain::config::FramingMode;
use rc_domain::stream::{ControlFrame, CONTROL_PREFIX};
use rc_domain::StreamFrame;

use crate::classifier::classify;

const FRAME_END: &str = "\n\n";

/// Stateful fragment-to-frame splitter for one exchange.
#[derive(Debug)]
pub enum Framer {
    Sniff,
    Delimited(DelimitedFramer),
}

impl Framer {
    pub fn new(mode: FramingMode) -> Self {
        match mode {
            FramingMode::Sniff => Framer::Sniff,
            FramingMode::Delimited => Framer::Delimited(DelimitedFramer::default()),
        }
    }

    /// Feed one decoded fragment; returns the frames it completes.
    pub fn push(&mut self, fragment: &str) -> Vec<StreamFrame> {
        if fragment.is_empty() {
            return Vec::new();
        }
        match self {
            Framer::Sniff => vec![classify(fragment)],
            Framer::Delimited(inner) => inner.push(fragment),
        }
    }

    /// Flush buffered input at end of stream.
    pub fn finish(&mut self) -> Vec<StreamFrame> {
        match self {
            Framer::Sniff => Vec::new(),
            Framer::Delimited(inner) => inner.finish(),
        }
    }
}

/// Buffering splitter for [`FramingMode::Delimited`].
#[derive(Debug)]
pub struct DelimitedFramer {
    buffer: String,
    /// Whether `buffer[0]` sits at the start of a line.
    at_line_start: bool,
    /// Whether `buffer` holds the body of an open control frame.
    in_frame: bool,
}

impl Default for DelimitedFramer {
    fn default() -> Self {
        Self {
            buffer: String::new(),
            at_line_start: true,
            in_frame: false,
        }
    }
}

impl DelimitedFramer {
    pub fn push(&mut self, fragment: &str) -> Vec<StreamFrame> {
        self.buffer.push_str(fragment);
        let mut frames = Vec::new();

        loop {
            if self.in_frame {
                let Some(end) = self.buffer.find(FRAME_END) else {
                    break;
                };
                let body: String = self.buffer.drain(..end).collect();
                self.buffer.drain(..FRAME_END.len());
                self.in_frame = false;
                self.at_line_start = true;
                frames.push(parse_frame_body(&body, true));
                continue;
            }

            if let Some(start) = self.find_marker() {
                if start > 0 {
                    frames.push(StreamFrame::text(self.take_text(start)));
                }
                self.buffer.drain(..CONTROL_PREFIX.len());
                self.in_frame = true;
                continue;
            }

            // No marker: emit all text except a tail that could still grow
            // into one.
            let keep = self.partial_marker_len();
            let emit = self.buffer.len() - keep;
            if emit > 0 {
                frames.push(StreamFrame::text(self.take_text(emit)));
            }
            break;
        }

        frames
    }

    pub fn finish(&mut self) -> Vec<StreamFrame> {
        let rest = std::mem::take(&mut self.buffer);
        let was_in_frame = std::mem::replace(&mut self.in_frame, false);
        self.at_line_start = true;

        if was_in_frame {
            // Unterminated frame: accept it if it parses on its own.
            vec![parse_frame_body(rest.trim_end(), false)]
        } else if rest.is_empty() {
            Vec::new()
        } else {
            vec![StreamFrame::text(rest)]
        }
    }

    /// Byte offset of the first marker that starts a line.
    fn find_marker(&self) -> Option<usize> {
        let bytes = self.buffer.as_bytes();
        self.buffer
            .match_indices(CONTROL_PREFIX)
            .map(|(i, _)| i)
            .find(|&i| if i == 0 { self.at_line_start } else { bytes[i - 1] == b'\n' })
    }

    /// Length of a trailing, line-initial proper prefix of the marker.
    fn partial_marker_len(&self) -> usize {
        let bytes = self.buffer.as_bytes();
        (1..CONTROL_PREFIX.len())
            .rev()
            .find(|&n| {
                if !self.buffer.ends_with(&CONTROL_PREFIX[..n]) {
                    return false;
                }
                let start = self.buffer.len() - n;
                if start == 0 {
                    self.at_line_start
                } else {
                    bytes[start - 1] == b'\n'
                }
            })
            .unwrap_or(0)
    }

    /// Remove and return the first `len` bytes as text.
    fn take_text(&mut self, len: usize) -> String {
        let text: String = self.buffer.drain(..len).collect();
        self.at_line_start = text.ends_with('\n');
        text
    }
}

/// Parse a frame body; a body that is not a recognized frame is given back
/// as text exactly as it appeared on the wire.
fn parse_frame_body(body: &str, terminated: bool) -> StreamFrame {
    match serde_json::from_str::<ControlFrame>(body) {
        Ok(frame) => frame.into(),
        Err(e) => {
            tracing::debug!(error = %e, "delimited segment is not a control frame");
            let mut raw = String::with_capacity(CONTROL_PREFIX.len() + body.len() + 2);
            raw.push_str(CONTROL_PREFIX);
            raw.push_str(body);
            if terminated {
                raw.push_str(FRAME_END);
            }
            StreamFrame::text(raw)
        }
    }
}
