//! Hand-off between a waiting signer and the TUI signature prompt

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

/// At most one outstanding "sign this?" question.
///
/// The wallet side calls [`request`](Self::request) and awaits the receiver;
/// the UI side answers through [`resolve`](Self::resolve). Dropping an
/// unanswered request counts as a decline.
#[derive(Debug, Clone, Default)]
pub struct SignatureApprovals {
    pending: Arc<Mutex<Option<oneshot::Sender<bool>>>>,
}

impl SignatureApprovals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new question, declining any stale one
    pub fn request(&self) -> oneshot::Receiver<bool> {
        let (tx, rx) = oneshot::channel();
        *self.slot() = Some(tx);
        rx
    }

    /// Answer the outstanding question. Returns false if nothing was waiting.
    pub fn resolve(&self, approved: bool) -> bool {
        match self.slot().take() {
            Some(tx) => tx.send(approved).is_ok(),
            None => false,
        }
    }

    /// Decline whatever is outstanding
    pub fn cancel(&self) {
        self.slot().take();
    }

    pub fn is_pending(&self) -> bool {
        self.slot().is_some()
    }

    fn slot(&self) -> MutexGuard<'_, Option<oneshot::Sender<bool>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
