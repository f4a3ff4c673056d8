use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// A boxed async stream, used for streamed backend responses.
pub type BoxStream<'a, T> = Pin<Box<dyn futures_core::Stream<Item = T> + Send + 'a>>;

/// Raw response body chunks as they arrive from the transport.
pub type ByteStream = BoxStream<'static, crate::Result<Vec<u8>>>;

/// Prefix marker the backend puts in front of a control frame.
pub const CONTROL_PREFIX: &str = "data: ";

/// One classified piece of a streamed answer.
///
/// Produced transiently while an exchange is consumed; only the
/// accumulated result ever becomes part of a [`Turn`](crate::Turn).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamFrame {
    /// Literal narrative text, appended to the answer as-is.
    TextDelta { text: String },
    /// Retrieved context chunks for the answer being streamed.
    Context { chunks: Vec<String> },
}

impl StreamFrame {
    pub fn text(text: impl Into<String>) -> Self {
        StreamFrame::TextDelta { text: text.into() }
    }

    pub fn context(chunks: Vec<String>) -> Self {
        StreamFrame::Context { chunks }
    }
}

/// Structured payloads the backend may embed in the stream.
///
/// Only `{"type": "context", "chunks": [...]}` is recognized; any other
/// `type` fails to deserialize, which callers treat as plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControlFrame {
    #[serde(rename = "context")]
    Context { chunks: Vec<String> },
}

impl From<ControlFrame> for StreamFrame {
    fn from(frame: ControlFrame) -> Self {
        match frame {
            ControlFrame::Context { chunks } => StreamFrame::Context { chunks },
        }
    }
}
