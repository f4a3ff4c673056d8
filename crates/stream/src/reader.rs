//! Turning a raw response body into a stream of frames.
//!
//! Mirrors the buffering loop every streamed response goes through:
//! pull the next body chunk, decode, split into frames, and flush the
//! decoder and framer when the body closes.

use futures_util::StreamExt;
use rc_domain::config::FramingMode;
use rc_domain::error::Result;
use rc_domain::stream::{BoxStream, ByteStream};
use rc_domain::StreamFrame;

use crate::accumulator::{Accumulator, FinalAnswer};
use crate::decode::Utf8Decoder;
use crate::framing::Framer;

/// Build a [`BoxStream`] of frames from a response body.
///
/// Frames are yielded strictly in arrival order.  A transport error is
/// yielded once and ends the stream; nothing buffered is flushed after it.
pub fn frame_stream(body: ByteStream, mode: FramingMode) -> BoxStream<'static, Result<StreamFrame>> {
    let stream = async_stream::stream! {
        let mut body = body;
        let mut decoder = Utf8Decoder::new();
        let mut framer = Framer::new(mode);

        loop {
            match body.next().await {
                Some(Ok(bytes)) => {
                    let text = decoder.decode(&bytes);
                    for frame in framer.push(&text) {
                        yield Ok(frame);
                    }
                }
                Some(Err(e)) => {
                    yield Err(e);
                    break;
                }
                None => {
                    // Body closed -- flush held bytes and any open frame.
                    let tail = decoder.finish();
                    for frame in framer.push(&tail) {
                        yield Ok(frame);
                    }
                    for frame in framer.finish() {
                        yield Ok(frame);
                    }
                    break;
                }
            }
        }
    };

    Box::pin(stream)
}

/// Drain a frame stream into a finished answer.
pub async fn accumulate(mut frames: BoxStream<'static, Result<StreamFrame>>) -> Result<FinalAnswer> {
    let mut acc = Accumulator::new();
    while let Some(frame) = frames.next().await {
        acc.on_fragment(frame?);
    }
    Ok(acc.finalize())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
