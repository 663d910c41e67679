//! Per-page-load selection context.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::label::QualityLabel;

/// State shared by the orchestrator and the watcher of one page load.
///
/// `done` flips false → true exactly once and never resets. A new page load
/// gets a new session.
#[derive(Debug, Default)]
pub struct SelectionSession {
    done: AtomicBool,
    in_flight: AtomicBool,
    rerun_requested: AtomicBool,
    attempts: AtomicU64,
    selected: Mutex<Option<QualityLabel>>,
    done_token: CancellationToken,
}

impl SelectionSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }

    /// Record the selection. Returns `true` only for the call that performed
    /// the transition; later calls leave the first label in place.
    pub fn mark_done(&self, label: QualityLabel) -> bool {
        if self
            .done
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }
        *self.selected.lock() = Some(label);
        self.done_token.cancel();
        true
    }

    /// The label chosen by this session, once done.
    pub fn selected(&self) -> Option<QualityLabel> {
        self.selected.lock().clone()
    }

    /// Token cancelled at the moment the session becomes done.
    pub fn done_token(&self) -> CancellationToken {
        self.done_token.clone()
    }

    /// Resolves once the session is done.
    pub async fn wait_done(&self) {
        self.done_token.cancelled().await
    }

    /// Claim the single in-flight slot. On failure a rerun is requested so
    /// the current holder makes one more pass before releasing.
    pub fn try_begin(&self) -> Option<AttemptGuard<'_>> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            Some(AttemptGuard { session: self })
        } else {
            self.rerun_requested.store(true, Ordering::SeqCst);
            None
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Consume a pending rerun request.
    pub fn take_rerun(&self) -> bool {
        self.rerun_requested.swap(false, Ordering::SeqCst)
    }

    /// Count an attempt pass and return its 1-based number.
    pub fn record_attempt(&self) -> u64 {
        self.attempts.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }
}

/// Holds the in-flight slot; released on drop.
#[derive(Debug)]
pub struct AttemptGuard<'a> {
    session: &'a SelectionSession,
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        self.session.in_flight.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_done_once() {
        let session = SelectionSession::new();
        assert!(!session.is_done());
        assert!(session.selected().is_none());

        assert!(session.mark_done("1080p60".into()));
        assert!(session.is_done());
        assert!(session.done_token().is_cancelled());

        assert!(!session.mark_done("720p".into()));
        assert_eq!(session.selected(), Some("1080p60".into()));
    }

    #[test]
    fn test_single_flight_guard() {
        let session = SelectionSession::new();
        let guard = session.try_begin().unwrap();
        assert!(session.is_in_flight());

        assert!(session.try_begin().is_none());
        assert!(session.take_rerun());
        assert!(!session.take_rerun());

        drop(guard);
        assert!(!session.is_in_flight());
        assert!(session.try_begin().is_some());
    }

    #[test]
    fn test_record_attempt() {
        let session = SelectionSession::new();
        assert_eq!(session.record_attempt(), 1);
        assert_eq!(session.record_attempt(), 2);
        assert_eq!(session.attempts(), 2);
    }

    #[tokio::test]
    async fn test_wait_done() {
        let session = std::sync::Arc::new(SelectionSession::new());
        let waiter = {
            let session = session.clone();
            tokio::spawn(async move { session.wait_done().await })
        };
        session.mark_done("Auto".into());
        waiter.await.unwrap();
    }
}
