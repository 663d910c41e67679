//! `SignalSource` backed by an injected page script.
//!
//! The script installs a `MutationObserver` on the document element and a
//! capturing `play` listener on the document. Both report through the
//! [`SIGNAL_BINDING`] runtime binding; the page runner hands each
//! `Runtime.bindingCalled` payload to [`CdpSignals::forward`].

use std::sync::Arc;

use async_trait::async_trait;
use autoquality_core::{DomResult, PageSignal, SignalSource};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::error::CdpError;
use crate::session::PageSession;

/// Name of the binding the page script calls. Must match `signals_install.js`.
pub const SIGNAL_BINDING: &str = "__autoqualitySignal";

const INSTALL_SCRIPT: &str = include_str!("signals_install.js");
const UNINSTALL_SCRIPT: &str = include_str!("signals_uninstall.js");

/// The runtime calls the signal bridge needs from a page.
#[async_trait]
pub trait SignalRuntime: Send + Sync {
    async fn add_binding(&self, name: &str) -> Result<(), CdpError>;

    async fn remove_binding(&self, name: &str) -> Result<(), CdpError>;

    async fn run_script(&self, script: &str) -> Result<(), CdpError>;

    /// Identifies the page in logs.
    fn page_id(&self) -> &str;
}

#[async_trait]
impl SignalRuntime for PageSession {
    async fn add_binding(&self, name: &str) -> Result<(), CdpError> {
        PageSession::add_binding(self, name).await
    }

    async fn remove_binding(&self, name: &str) -> Result<(), CdpError> {
        PageSession::remove_binding(self, name).await
    }

    async fn run_script(&self, script: &str) -> Result<(), CdpError> {
        self.evaluate(script).await?;
        Ok(())
    }

    fn page_id(&self) -> &str {
        self.session_id()
    }
}

pub struct CdpSignals<R: SignalRuntime = PageSession> {
    runtime: Arc<R>,
    sink: Mutex<Option<mpsc::UnboundedSender<PageSignal>>>,
}

impl<R: SignalRuntime> CdpSignals<R> {
    pub fn new(runtime: Arc<R>) -> Self {
        Self {
            runtime,
            sink: Mutex::new(None),
        }
    }

    /// Deliver one binding payload. Returns `false` if nothing was delivered.
    pub fn forward(&self, payload: &str) -> bool {
        let Some(signal) = PageSignal::from_wire(payload) else {
            debug!("Ignoring unknown page signal {:?}", payload);
            return false;
        };
        let sink = self.sink.lock();
        match sink.as_ref() {
            Some(tx) => {
                trace!("Page signal {:?}", signal);
                tx.send(signal).is_ok()
            }
            None => false,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.sink.lock().is_some()
    }
}

#[async_trait]
impl<R: SignalRuntime> SignalSource for CdpSignals<R> {
    /// Either both producers are installed, or neither is.
    async fn attach(&self, tx: mpsc::UnboundedSender<PageSignal>) -> DomResult<()> {
        self.runtime.add_binding(SIGNAL_BINDING).await?;
        if let Err(e) = self.runtime.run_script(INSTALL_SCRIPT).await {
            if let Err(unbind) = self.runtime.remove_binding(SIGNAL_BINDING).await {
                debug!("Failed to remove signal binding: {}", unbind);
            }
            return Err(e.into());
        }
        *self.sink.lock() = Some(tx);
        debug!("Page signals attached for session {}", self.runtime.page_id());
        Ok(())
    }

    async fn detach(&self) -> DomResult<()> {
        self.sink.lock().take();
        let uninstall = self.runtime.run_script(UNINSTALL_SCRIPT).await;
        let unbind = self.runtime.remove_binding(SIGNAL_BINDING).await;
        debug!("Page signals detached for session {}", self.runtime.page_id());
        uninstall?;
        unbind?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use autoquality_core::DomError;

    use super::*;

    #[derive(Default)]
    struct RecordingRuntime {
        calls: Mutex<Vec<String>>,
        fail_install: bool,
    }

    impl RecordingRuntime {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl SignalRuntime for RecordingRuntime {
        async fn add_binding(&self, name: &str) -> Result<(), CdpError> {
            self.calls.lock().push(format!("add {}", name));
            Ok(())
        }

        async fn remove_binding(&self, name: &str) -> Result<(), CdpError> {
            self.calls.lock().push(format!("remove {}", name));
            Ok(())
        }

        async fn run_script(&self, script: &str) -> Result<(), CdpError> {
            let install = script == INSTALL_SCRIPT;
            self.calls
                .lock()
                .push(if install { "install" } else { "uninstall" }.to_string());
            if install && self.fail_install {
                return Err(CdpError::JavaScript("ReferenceError: MutationObserver".to_string()));
            }
            Ok(())
        }

        fn page_id(&self) -> &str {
            "S1"
        }
    }

    #[test]
    fn test_install_script_uses_binding() {
        assert!(INSTALL_SCRIPT.contains(SIGNAL_BINDING));
        assert!(INSTALL_SCRIPT.contains("\"mutation\""));
        assert!(INSTALL_SCRIPT.contains("\"play\""));
        assert!(INSTALL_SCRIPT.contains("childList: true, subtree: true"));
    }

    #[test]
    fn test_uninstall_script_removes_both_producers() {
        assert!(UNINSTALL_SCRIPT.contains("observer.disconnect()"));
        assert!(UNINSTALL_SCRIPT.contains("removeEventListener(\"play\""));
    }

    #[tokio::test]
    async fn test_attach_forward_detach() {
        let runtime = Arc::new(RecordingRuntime::default());
        let signals = CdpSignals::new(runtime.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();

        signals.attach(tx).await.unwrap();
        assert!(signals.is_attached());
        assert!(signals.forward("play"));
        assert!(!signals.forward("pause"));
        assert_eq!(rx.recv().await, Some(PageSignal::PlaybackStarted));

        signals.detach().await.unwrap();
        assert!(!signals.is_attached());
        assert!(!signals.forward("mutation"));
        assert_eq!(rx.recv().await, None);
        assert_eq!(
            runtime.calls(),
            vec![
                "add __autoqualitySignal",
                "install",
                "uninstall",
                "remove __autoqualitySignal"
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_install_removes_binding() {
        let runtime = Arc::new(RecordingRuntime {
            fail_install: true,
            ..RecordingRuntime::default()
        });
        let signals = CdpSignals::new(runtime.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let err = signals.attach(tx).await.unwrap_err();
        assert!(matches!(err, DomError::Script(_)));
        assert!(!signals.is_attached());
        assert_eq!(
            runtime.calls(),
            vec!["add __autoqualitySignal", "install", "remove __autoqualitySignal"]
        );
        // The sender was dropped with the failed attach.
        assert_eq!(rx.recv().await, None);
    }
}
