//! One-exchange-at-a-time guard for a session.
//!
//! Backed by a `Semaphore(1)`.  Unlike a queueing lock, a second
//! submission while an exchange is in flight is rejected straight away,
//! which is what closes the submission gate in the UI.

use std::sync::Arc;

use rc_domain::error::{Error, Result};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

#[derive(Debug, Clone)]
pub struct ExchangeLock {
    sem: Arc<Semaphore>,
}

impl Default for ExchangeLock {
    fn default() -> Self {
        Self::new()
    }
}

impl ExchangeLock {
    pub fn new() -> Self {
        Self {
            sem: Arc::new(Semaphore::new(1)),
        }
    }

    /// Take the lock for one exchange.  Hold the permit for the whole
    /// exchange; it releases on drop.
    pub fn try_acquire(&self) -> Result<OwnedSemaphorePermit> {
        self.sem
            .clone()
            .try_acquire_owned()
            .map_err(|_| Error::SessionBusy)
    }

    /// Whether an exchange currently holds the lock.
    pub fn is_held(&self) -> bool {
        self.sem.available_permits() == 0
    }
}
