//! Client side of the question-answering backend: the knowledge-base
//! directory and streamed query submission.

pub mod http;
pub mod traits;
pub(crate) mod util;

// Re-exports for convenience.
pub use http::HttpBackend;
pub use traits::{KnowledgeBaseList, QaBackend, QaRequest};
