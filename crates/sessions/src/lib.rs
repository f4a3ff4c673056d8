//! Chat session state for ragchat.
//!
//! A [`ChatSession`] owns the append-only [`Transcript`], the knowledge-base
//! selection, and at most one in-flight exchange.  Exchanges run as
//! spawned tasks ([`exchange::spawn_exchange`]) that forward classified
//! frames back to the session, which folds them into the live view and
//! appends the finished assistant turn.  Display helpers live in
//! [`citation`] (placeholder numbering) and [`lookup`] (the context
//! detail view).

pub mod cancel;
pub mod citation;
pub mod exchange;
pub mod lock;
pub mod lookup;
pub mod session;
pub mod transcript;

pub use cancel::CancelToken;
pub use citation::numbered;
pub use exchange::{ExchangeEvent, ExchangeHandle};
pub use lock::ExchangeLock;
pub use lookup::{ContextEntry, ContextView};
pub use session::{ChatSession, DisplayTurn, Gate, LiveTail, Step};
pub use transcript::Transcript;
