//! Activation watcher: turns page signals into selection attempts.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::dom::{PageDom, PageSignal, SignalSource};
use crate::error::DomResult;
use crate::label::QualityLabel;
use crate::orchestrator::{AttemptOutcome, SelectionOrchestrator};

/// Ownership of the structural observer and the playback listener.
///
/// Both are attached and released together, and release happens once.
pub struct WatcherHandles<S: SignalSource> {
    source: Arc<S>,
    active: AtomicBool,
}

impl<S: SignalSource> WatcherHandles<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            active: AtomicBool::new(false),
        }
    }

    pub async fn attach(&self, tx: mpsc::UnboundedSender<PageSignal>) -> DomResult<()> {
        self.source.attach(tx).await?;
        self.active.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Detach both producers. Returns `false` if already released.
    pub async fn release(&self) -> bool {
        if !self.active.swap(false, Ordering::SeqCst) {
            return false;
        }
        if let Err(e) = self.source.detach().await {
            warn!("Failed to detach page signal source: {}", e);
        }
        true
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Summary of one watcher run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchReport {
    pub selected: Option<QualityLabel>,
    pub attempts: u64,
    pub mutations: u64,
    pub plays: u64,
}

/// Bridges page signals to the orchestrator until a selection is made.
pub struct ActivationWatcher<D: PageDom, S: SignalSource> {
    orchestrator: Arc<SelectionOrchestrator<D>>,
    handles: WatcherHandles<S>,
}

impl<D: PageDom, S: SignalSource> ActivationWatcher<D, S> {
    pub fn new(orchestrator: Arc<SelectionOrchestrator<D>>, source: Arc<S>) -> Self {
        Self {
            orchestrator,
            handles: WatcherHandles::new(source),
        }
    }

    pub fn orchestrator(&self) -> &Arc<SelectionOrchestrator<D>> {
        &self.orchestrator
    }

    pub fn is_active(&self) -> bool {
        self.handles.is_active()
    }

    /// Attach to the page, make the initial attempt, then react to signals
    /// until the session is done or the signal source goes away.
    ///
    /// Signals that queue up while an attempt runs are folded into a single
    /// follow-up evaluation. The handles are released before returning.
    pub async fn run(&self) -> DomResult<WatchReport> {
        let session = self.orchestrator.session().clone();
        let mut report = WatchReport::default();

        let (tx, mut rx) = mpsc::unbounded_channel();
        self.handles.attach(tx).await?;
        debug!("Activation watcher attached");

        self.attempt(&mut report).await;

        let done = session.done_token();
        while !session.is_done() {
            let first = tokio::select! {
                biased;
                _ = done.cancelled() => break,
                signal = rx.recv() => signal,
            };
            let Some(first) = first else {
                debug!("Page signal source closed");
                break;
            };

            let mut mutation = false;
            let mut play = false;
            let mut pending = Some(first);
            while let Some(signal) = pending {
                match signal {
                    PageSignal::Mutation => {
                        report.mutations += 1;
                        mutation = true;
                    }
                    PageSignal::PlaybackStarted => {
                        report.plays += 1;
                        play = true;
                    }
                }
                pending = rx.try_recv().ok();
            }

            if play {
                debug!("Playback started; attempting selection");
                self.attempt(&mut report).await;
            } else if mutation && self.menu_present().await {
                debug!("Quality menu mounted; attempting selection");
                self.attempt(&mut report).await;
            }
        }

        self.cleanup().await;
        report.selected = session.selected();
        Ok(report)
    }

    /// Release the observer and the listener. Idempotent.
    pub async fn cleanup(&self) {
        if self.handles.release().await {
            info!("Activation watcher detached");
        }
    }

    async fn attempt(&self, report: &mut WatchReport) {
        let outcome = self.orchestrator.attempt_once().await;
        if !matches!(outcome, AttemptOutcome::AlreadyDone | AttemptOutcome::Coalesced) {
            report.attempts += 1;
        }
        debug!(?outcome, "Selection attempt finished");
    }

    async fn menu_present(&self) -> bool {
        if self.orchestrator.session().is_done() {
            return false;
        }
        let accessor = self.orchestrator.accessor();
        let present = match accessor.find_menu_container().await {
            Ok(found) => found.is_some(),
            Err(e) => {
                debug!("Menu lookup failed: {}", e);
                false
            }
        };
        accessor.release_handles().await;
        present
    }
}
