//! The streaming task behind one exchange.
//!
//! [`spawn_exchange`] submits the query, turns the response body into
//! frames, and forwards them over a channel until the body ends, an error
//! occurs, or the exchange is cancelled.  Exactly one terminal event
//! (`Completed`, `Failed`, or `Cancelled`) is sent last.

use std::sync::Arc;

use futures_util::StreamExt;
use rc_backend::{QaBackend, QaRequest};
use rc_domain::config::FramingMode;
use rc_domain::error::Error;
use rc_domain::StreamFrame;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::cancel::CancelToken;

/// Events sent from an exchange task to the session that started it.
#[derive(Debug)]
pub enum ExchangeEvent {
    /// One classified piece of the answer, in arrival order.
    Frame(StreamFrame),
    /// The body ended normally.
    Completed,
    /// The request or the stream failed.
    Failed(Error),
    /// The exchange was cancelled before the body ended.
    Cancelled,
}

impl ExchangeEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExchangeEvent::Frame(_))
    }
}

/// The caller's end of a running exchange.
#[derive(Debug)]
pub struct ExchangeHandle {
    id: Uuid,
    rx: mpsc::Receiver<ExchangeEvent>,
    token: CancelToken,
}

impl ExchangeHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// A token that cancels this exchange (e.g. from a Ctrl-C handler).
    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Next event, or `None` once the task has gone away.
    pub async fn next_event(&mut self) -> Option<ExchangeEvent> {
        self.rx.recv().await
    }
}

impl Drop for ExchangeHandle {
    fn drop(&mut self) {
        // Nobody can consume the events any more.
        self.token.cancel();
    }
}

/// Spawn the streaming task for one exchange.
pub fn spawn_exchange(
    backend: Arc<dyn QaBackend>,
    request: QaRequest,
    framing: FramingMode,
    token: CancelToken,
) -> ExchangeHandle {
    let (tx, rx) = mpsc::channel::<ExchangeEvent>(64);
    let id = Uuid::new_v4();
    let task_token = token.clone();

    tokio::spawn(async move {
        let terminal = tokio::select! {
            biased;
            _ = task_token.cancelled() => ExchangeEvent::Cancelled,
            result = forward_frames(backend, request, framing, &tx) => match result {
                Ok(()) => ExchangeEvent::Completed,
                Err(e) => ExchangeEvent::Failed(e),
            },
        };
        // The receiver may already be gone if the session was dropped.
        let _ = tx.send(terminal).await;
    });

    ExchangeHandle { id, rx, token }
}

async fn forward_frames(
    backend: Arc<dyn QaBackend>,
    request: QaRequest,
    framing: FramingMode,
    tx: &mpsc::Sender<ExchangeEvent>,
) -> Result<(), Error> {
    let body = backend.ask(&request).await?;
    let mut frames = rc_stream::frame_stream(body, framing);

    while let Some(frame) = frames.next().await {
        let frame = frame?;
        if tx.send(ExchangeEvent::Frame(frame)).await.is_err() {
            // Nobody is listening any more; stop reading.
            return Err(Error::Cancelled);
        }
    }
    Ok(())
}
