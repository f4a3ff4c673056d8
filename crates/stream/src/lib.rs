//! Incremental consumption of streamed answers.
//!
//! Bytes from the backend are decoded into text fragments
//! ([`decode::Utf8Decoder`]), split into [`StreamFrame`]s by a
//! [`framing::Framer`] (which uses [`classifier::classify`] in the default
//! sniffing mode), and folded into an answer by an
//! [`accumulator::Accumulator`].  [`reader::frame_stream`] wires the three
//! together over a [`ByteStream`].
//!
//! [`StreamFrame`]: rc_domain::StreamFrame
//! [`ByteStream`]: rc_domain::stream::ByteStream

pub mod accumulator;
pub mod classifier;
pub mod decode;
pub mod framing;
pub mod reader;

pub use accumulator::{Accumulator, FinalAnswer, Update};
pub use classifier::classify;
pub use decode::Utf8Decoder;
pub use framing::Framer;
pub use reader::{accumulate, frame_stream};
