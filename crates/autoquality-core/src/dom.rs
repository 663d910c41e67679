//! Page abstraction consumed by the menu accessor and the watcher.

use std::fmt::Debug;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::DomResult;

/// Read and act on the live document of one page.
///
/// Handles are only valid for the document snapshot they were read from;
/// callers must re-query after every suspension point.
#[async_trait]
pub trait PageDom: Send + Sync {
    /// Opaque reference to one element.
    type Handle: Clone + Debug + Send + Sync + 'static;

    /// First element in document order matching `selector`.
    async fn query_selector(&self, selector: &str) -> DomResult<Option<Self::Handle>>;

    /// Descendants of `scope` matching `selector`, in document order.
    async fn query_selector_all(
        &self,
        scope: &Self::Handle,
        selector: &str,
    ) -> DomResult<Vec<Self::Handle>>;

    /// Concatenated text of the element and its descendants.
    async fn text_content(&self, node: &Self::Handle) -> DomResult<String>;

    async fn attribute(&self, node: &Self::Handle, name: &str) -> DomResult<Option<String>>;

    /// The element itself or its nearest ancestor matching `selector`.
    async fn closest(&self, node: &Self::Handle, selector: &str) -> DomResult<Option<Self::Handle>>;

    async fn element_by_id(&self, id: &str) -> DomResult<Option<Self::Handle>>;

    /// Synthesized user activation (`HTMLElement.click()`).
    async fn click(&self, node: &Self::Handle) -> DomResult<()>;

    /// Drop every handle handed out so far. Callers hold no handle across it.
    async fn release_handles(&self) -> DomResult<()> {
        Ok(())
    }
}

/// Signals that may make a quality menu available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageSignal {
    /// A batch of child-list mutations somewhere under the document element.
    Mutation,
    /// A media element fired `play` (observed in the capture phase).
    PlaybackStarted,
}

impl PageSignal {
    /// Parse the wire name used by injected page scripts.
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "mutation" => Some(PageSignal::Mutation),
            "play" => Some(PageSignal::PlaybackStarted),
            _ => None,
        }
    }
}

/// Registers the structural observer and the playback listener on a page.
///
/// Both producers are attached and detached together.
#[async_trait]
pub trait SignalSource: Send + Sync {
    /// Start delivering signals into `tx`.
    async fn attach(&self, tx: mpsc::UnboundedSender<PageSignal>) -> DomResult<()>;

    /// Stop both producers and drop every sender clone. Idempotent.
    async fn detach(&self) -> DomResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_from_wire() {
        assert_eq!(PageSignal::from_wire("mutation"), Some(PageSignal::Mutation));
        assert_eq!(PageSignal::from_wire("play"), Some(PageSignal::PlaybackStarted));
        assert_eq!(PageSignal::from_wire("pause"), None);
    }
}
