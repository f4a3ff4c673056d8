//! Shared types for the ragchat crates: conversation turns, stream frames,
//! the common error type, configuration, and structured trace events.

pub mod config;
pub mod error;
pub mod stream;
pub mod trace;
pub mod turn;

pub use error::{Error, Result};
pub use stream::StreamFrame;
pub use turn::{Role, Turn};
