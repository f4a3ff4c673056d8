/// Shared error type used across all ragchat crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    /// The response carried no readable body.
    #[error("response stream unavailable")]
    StreamUnavailable,

    /// An exchange is already in flight for this session.
    #[error("session is busy: an exchange is already in flight")]
    SessionBusy,

    /// The submission gate is closed (blank query or no knowledge base).
    #[error("submission blocked: {0}")]
    SubmissionBlocked(String),

    #[error("exchange cancelled")]
    Cancelled,

    #[error("config: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether retrying the same exchange could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::Timeout(_) | Error::StreamUnavailable => true,
            Error::Backend { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_are_retryable() {
        assert!(Error::StreamUnavailable.is_retryable());
        assert!(Error::Timeout("read".into()).is_retryable());
        assert!(Error::Backend { status: 502, message: "bad gateway".into() }.is_retryable());
    }

    #[test]
    fn client_side_failures_are_not_retryable() {
        assert!(!Error::Backend { status: 400, message: "no kb".into() }.is_retryable());
        assert!(!Error::SessionBusy.is_retryable());
        assert!(!Error::Cancelled.is_retryable());
    }

    #[test]
    fn backend_error_display_includes_status() {
        let e = Error::Backend { status: 400, message: "knowledge_base_name is required".into() };
        assert_eq!(e.to_string(), "backend returned 400: knowledge_base_name is required");
    }
}
