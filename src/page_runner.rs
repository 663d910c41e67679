//! Per-tab driver: one activation watcher per document load.

use std::future::pending;
use std::sync::Arc;

use autoquality_cdp::{
    CdpClient, CdpDom, CdpError, CdpSignals, PageEvent, PageInfo, SIGNAL_BINDING,
};
use autoquality_config::Config;
use autoquality_core::{
    ActivationWatcher, CancellationToken, DomResult, LabelMatcher, LocatorStrategy, MenuAccessor,
    SelectionOrchestrator, SelectionSession, WatchReport,
};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, trace, warn};

type CdpWatcher = ActivationWatcher<CdpDom, CdpSignals>;
type WatchTask = JoinHandle<DomResult<WatchReport>>;

/// What ended one document's watch.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    /// A new document loaded; start over with a fresh session.
    Rearm,
    /// The tab went away or left the matched site.
    Stop { detach: bool },
}

pub(crate) struct PageRunner {
    client: Arc<CdpClient>,
    config: Arc<Config>,
    locator: Arc<dyn LocatorStrategy>,
    shutdown: CancellationToken,
}

impl PageRunner {
    pub(crate) fn new(client: Arc<CdpClient>, config: Arc<Config>, shutdown: CancellationToken) -> Self {
        let locator = Arc::new(config.locator.to_locator());
        Self {
            client,
            config,
            locator,
            shutdown,
        }
    }

    /// Attach to `page` and keep it selected until it closes, leaves the
    /// matched site or shutdown is requested.
    pub(crate) async fn run(&self, page: &PageInfo) -> Result<(), CdpError> {
        let session = Arc::new(self.client.attach_page(&page.id).await?);
        let mut events = session.take_events().ok_or(CdpError::SessionClosed)?;
        info!(target_id = %page.id, url = %page.url, "Watching page");

        let mut loads = 0u64;
        loop {
            loads += 1;
            let dom = Arc::new(CdpDom::new(session.clone()));
            let signals = Arc::new(CdpSignals::new(session.clone()));
            let watcher = Arc::new(self.build_watcher(dom.clone(), signals.clone()));
            let mut task = Some(tokio::spawn({
                let watcher = watcher.clone();
                async move { watcher.run().await }
            }));
            debug!(target_id = %page.id, load = loads, "Watcher armed");

            let step = loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => break Step::Stop { detach: true },
                    joined = join_watch(&mut task) => {
                        task = None;
                        log_watch_result(&page.id, joined);
                        release_objects(&dom).await;
                    }
                    event = events.recv() => {
                        let Some(event) = event else {
                            debug!(target_id = %page.id, "Page event stream closed");
                            break Step::Stop { detach: false };
                        };
                        if let Some(step) = self.handle_event(PageEvent::classify(&event), &signals) {
                            break step;
                        }
                    }
                }
            };

            watcher.cleanup().await;
            if let Some(task) = task.take() {
                task.abort();
            }
            release_objects(&dom).await;

            match step {
                Step::Rearm => {
                    debug!(target_id = %page.id, "Page reloaded; re-arming");
                }
                Step::Stop { detach } => {
                    if detach {
                        if let Err(e) = self.client.detach_page(&session).await {
                            debug!("Failed to detach from {}: {}", page.id, e);
                        }
                    }
                    info!(target_id = %page.id, "Stopped watching page");
                    return Ok(());
                }
            }
        }
    }

    fn build_watcher(&self, dom: Arc<CdpDom>, signals: Arc<CdpSignals>) -> CdpWatcher {
        let selection = &self.config.selection;
        let orchestrator = SelectionOrchestrator::new(
            MenuAccessor::new(dom, self.locator.clone()),
            LabelMatcher::new(selection.preference_list()),
            selection.retry_schedule(),
            Arc::new(SelectionSession::new()),
        );
        ActivationWatcher::new(Arc::new(orchestrator), signals)
    }

    fn handle_event(&self, event: Option<PageEvent>, signals: &CdpSignals) -> Option<Step> {
        match event? {
            PageEvent::BindingCalled { name, payload } if name == SIGNAL_BINDING => {
                signals.forward(&payload);
                None
            }
            PageEvent::Loaded => Some(Step::Rearm),
            PageEvent::MainFrameNavigated { url } if !self.config.browser.matches_url(&url) => {
                info!(url = %url, "Page left the watched site");
                Some(Step::Stop { detach: true })
            }
            other => {
                trace!(?other, "Ignoring page event");
                None
            }
        }
    }
}

async fn release_objects(dom: &CdpDom) {
    if let Err(e) = dom.release().await {
        debug!("Failed to release page objects: {}", e);
    }
}

async fn join_watch(task: &mut Option<WatchTask>) -> Result<DomResult<WatchReport>, JoinError> {
    match task {
        Some(handle) => handle.await,
        None => pending().await,
    }
}

fn log_watch_result(target_id: &str, joined: Result<DomResult<WatchReport>, JoinError>) {
    match joined {
        Ok(Ok(report)) => match &report.selected {
            Some(label) => info!(
                target_id,
                selected = %label,
                attempts = report.attempts,
                "Quality selected"
            ),
            None => info!(target_id, attempts = report.attempts, "Watcher ended without a selection"),
        },
        Ok(Err(e)) => warn!(target_id, "Watcher failed: {}", e),
        Err(e) if e.is_cancelled() => {}
        Err(e) => warn!(target_id, "Watcher task panicked: {}", e),
    }
}
