//! Selection orchestrator: the one-shot "select best quality" action.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::accessor::MenuAccessor;
use crate::dom::PageDom;
use crate::label::QualityLabel;
use crate::matcher::LabelMatcher;
use crate::session::SelectionSession;

/// Default waits between menu reads after opening the trigger.
pub const DEFAULT_RETRY_DELAYS_MS: &[u64] = &[0, 30, 80, 150, 300, 600];

/// Bounded, escalating waits used after the trigger is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrySchedule {
    delays: Vec<Duration>,
}

impl RetrySchedule {
    pub fn new(delays: Vec<Duration>) -> Self {
        Self { delays }
    }

    pub fn from_millis(delays: &[u64]) -> Self {
        Self::new(delays.iter().copied().map(Duration::from_millis).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = Duration> + '_ {
        self.delays.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.delays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delays.is_empty()
    }

    /// Sum of all waits.
    pub fn budget(&self) -> Duration {
        self.delays.iter().sum()
    }
}

impl Default for RetrySchedule {
    fn default() -> Self {
        Self::from_millis(DEFAULT_RETRY_DELAYS_MS)
    }
}

/// What one call to [`SelectionOrchestrator::attempt_once`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The session was already done; nothing was read or clicked.
    AlreadyDone,
    /// Another attempt was in flight; it will make one more pass for us.
    Coalesced,
    /// A quality item was clicked.
    Selected(QualityLabel),
    /// No menu and no trigger on the page yet.
    NoTrigger,
    /// The trigger was found but no selectable entry appeared in time.
    NotReady,
}

/// Drives menu opening, bounded retries and the final click.
pub struct SelectionOrchestrator<D: PageDom> {
    accessor: MenuAccessor<D>,
    matcher: LabelMatcher,
    schedule: RetrySchedule,
    session: Arc<SelectionSession>,
}

impl<D: PageDom> SelectionOrchestrator<D> {
    pub fn new(
        accessor: MenuAccessor<D>,
        matcher: LabelMatcher,
        schedule: RetrySchedule,
        session: Arc<SelectionSession>,
    ) -> Self {
        Self {
            accessor,
            matcher,
            schedule,
            session,
        }
    }

    pub fn session(&self) -> &Arc<SelectionSession> {
        &self.session
    }

    pub fn accessor(&self) -> &MenuAccessor<D> {
        &self.accessor
    }

    /// Try to select the best quality.
    ///
    /// Safe to call from any number of triggers: only one pass runs at a
    /// time and nothing happens once the session is done.
    pub async fn attempt_once(&self) -> AttemptOutcome {
        if self.session.is_done() {
            return AttemptOutcome::AlreadyDone;
        }

        let mut outcome = AttemptOutcome::Coalesced;
        loop {
            let Some(guard) = self.session.try_begin() else {
                return outcome;
            };

            outcome = self.run_pass().await;
            while !self.session.is_done() && self.session.take_rerun() {
                debug!("Running coalesced selection pass");
                outcome = self.run_pass().await;
            }
            drop(guard);

            // A request may have landed between the last check and release.
            if self.session.is_done() || !self.session.take_rerun() {
                return outcome;
            }
        }
    }

    /// One pass; every handle it read is released before returning.
    async fn run_pass(&self) -> AttemptOutcome {
        let outcome = self.pass().await;
        self.accessor.release_handles().await;
        outcome
    }

    async fn pass(&self) -> AttemptOutcome {
        let attempt = self.session.record_attempt();
        debug!(attempt, "Starting quality selection pass");

        if let Some(label) = self.select_from_open_menu().await {
            return AttemptOutcome::Selected(label);
        }
        if self.session.is_done() {
            return AttemptOutcome::AlreadyDone;
        }

        let trigger = match self.accessor.find_trigger_control().await {
            Ok(Some(trigger)) => trigger,
            Ok(None) => {
                debug!(attempt, "Quality menu trigger not present");
                return AttemptOutcome::NoTrigger;
            }
            Err(e) => {
                warn!(attempt, "Failed to locate quality menu trigger: {}", e);
                return AttemptOutcome::NoTrigger;
            }
        };

        match self.accessor.open_menu(&trigger).await {
            Ok(true) => debug!(attempt, "Opened quality menu"),
            Ok(false) => debug!(attempt, "Quality menu already expanded"),
            Err(e) => debug!(attempt, "Failed to open quality menu: {}", e),
        }

        let token = self.session.done_token();
        for (step, delay) in self.schedule.iter().enumerate() {
            tokio::select! {
                biased;
                _ = token.cancelled() => return AttemptOutcome::AlreadyDone,
                _ = tokio::time::sleep(delay) => {}
            }
            if self.session.is_done() {
                return AttemptOutcome::AlreadyDone;
            }
            if let Some(label) = self.select_from_open_menu().await {
                debug!(attempt, step, "Selected after retry");
                return AttemptOutcome::Selected(label);
            }
        }

        debug!(
            attempt,
            budget_ms = self.schedule.budget().as_millis() as u64,
            "Retry budget exhausted without a selectable menu"
        );
        AttemptOutcome::NotReady
    }

    /// Read the mounted menu, pick the best entry and click it.
    async fn select_from_open_menu(&self) -> Option<QualityLabel> {
        if self.session.is_done() {
            return None;
        }

        let snapshot = match self.accessor.snapshot().await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return None,
            Err(e) => {
                debug!("Quality menu not readable: {}", e);
                return None;
            }
        };

        if snapshot.items.is_empty() {
            debug!("Quality menu mounted without items");
            return None;
        }

        let Some(best) = self.matcher.select_best(&snapshot.items) else {
            debug!(offered = snapshot.items.len(), "No offered quality matches the preferences");
            return None;
        };

        if !self.accessor.click_item(best.item).await {
            return None;
        }

        let label = best.item.label.clone();
        if self.session.mark_done(label.clone()) {
            info!(
                label = %label,
                pattern = %best.pattern,
                kind = ?best.kind,
                "Selected preferred quality"
            );
        }
        Some(label)
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
