//! Element tree with observer and listener bookkeeping.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::selector::Selector;
use crate::dom::{PageDom, PageSignal, SignalSource};
use crate::error::{DomError, DomResult};

/// Handle to one element of a [`MemoryPage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef(usize);

/// Description of an element to insert.
#[derive(Debug, Clone, Default)]
pub struct ElementSpec {
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
}

impl ElementSpec {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.retain(|(k, _)| k != name);
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn class(self, class: &str) -> Self {
        self.attr("class", class)
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }
}

type ClickHandler = Arc<dyn Fn(&MemoryPage, NodeRef) + Send + Sync>;

struct Node {
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
    parent: Option<usize>,
    children: Vec<usize>,
    connected: bool,
}

struct PageState {
    nodes: Vec<Node>,
    observers: Vec<mpsc::UnboundedSender<PageSignal>>,
    play_listeners: Vec<mpsc::UnboundedSender<PageSignal>>,
    click_handlers: HashMap<usize, ClickHandler>,
    clicks: Vec<NodeRef>,
    handle_releases: usize,
}

impl PageState {
    fn node(&self, node: NodeRef) -> DomResult<&Node> {
        match self.nodes.get(node.0) {
            Some(n) if n.connected => Ok(n),
            _ => Err(DomError::StaleHandle(format!("{:?}", node))),
        }
    }

    /// Descendants of `start` in document order, `start` excluded.
    fn descendants(&self, start: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.nodes[start].children.iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            out.push(idx);
            stack.extend(self.nodes[idx].children.iter().rev().copied());
        }
        out
    }

    fn matches(&self, idx: usize, selector: &Selector) -> bool {
        let node = &self.nodes[idx];
        selector.matches(&node.tag, &node.attrs)
    }

    fn text_of(&self, idx: usize) -> String {
        let node = &self.nodes[idx];
        let mut text = node.text.clone();
        for child in &node.children {
            text.push_str(&self.text_of(*child));
        }
        text
    }

    fn notify_mutation(&mut self) {
        self.observers
            .retain(|tx| tx.send(PageSignal::Mutation).is_ok());
    }
}

/// Shared, cloneable in-memory document.
///
/// Handles to removed elements report [`DomError::StaleHandle`]. Click
/// handlers run after the page lock is released and may mutate the page.
#[derive(Clone)]
pub struct MemoryPage {
    state: Arc<Mutex<PageState>>,
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPage {
    /// An empty `<html><body></body></html>` document.
    pub fn new() -> Self {
        let html = Node {
            tag: "html".to_string(),
            attrs: Vec::new(),
            text: String::new(),
            parent: None,
            children: vec![1],
            connected: true,
        };
        let body = Node {
            tag: "body".to_string(),
            attrs: Vec::new(),
            text: String::new(),
            parent: Some(0),
            children: Vec::new(),
            connected: true,
        };
        Self {
            state: Arc::new(Mutex::new(PageState {
                nodes: vec![html, body],
                observers: Vec::new(),
                play_listeners: Vec::new(),
                click_handlers: HashMap::new(),
                clicks: Vec::new(),
                handle_releases: 0,
            })),
        }
    }

    pub fn document_element(&self) -> NodeRef {
        NodeRef(0)
    }

    pub fn body(&self) -> NodeRef {
        NodeRef(1)
    }

    /// Append a new element under `parent`, notifying structural observers.
    pub fn append(&self, parent: NodeRef, spec: ElementSpec) -> NodeRef {
        let mut state = self.state.lock();
        let idx = state.nodes.len();
        let connected = state.nodes.get(parent.0).map(|p| p.connected).unwrap_or(false);
        state.nodes.push(Node {
            tag: spec.tag,
            attrs: spec.attrs,
            text: spec.text,
            parent: Some(parent.0),
            children: Vec::new(),
            connected,
        });
        if let Some(p) = state.nodes.get_mut(parent.0) {
            p.children.push(idx);
        }
        if connected {
            state.notify_mutation();
        }
        NodeRef(idx)
    }

    /// Detach `node` and its subtree from the document.
    pub fn remove(&self, node: NodeRef) {
        let mut state = self.state.lock();
        let Some(parent) = state.nodes.get(node.0).and_then(|n| n.parent) else {
            return;
        };
        let was_connected = state.nodes[node.0].connected;
        state.nodes[parent].children.retain(|c| *c != node.0);
        state.nodes[node.0].parent = None;
        for idx in std::iter::once(node.0).chain(state.descendants(node.0)) {
            state.nodes[idx].connected = false;
        }
        if was_connected {
            state.notify_mutation();
        }
    }

    /// Set an attribute. Attribute changes are not child-list mutations and
    /// do not notify observers.
    pub fn set_attribute(&self, node: NodeRef, name: &str, value: &str) {
        let mut state = self.state.lock();
        if let Some(n) = state.nodes.get_mut(node.0) {
            n.attrs.retain(|(k, _)| k != name);
            n.attrs.push((name.to_string(), value.to_string()));
        }
    }

    pub fn get_attribute(&self, node: NodeRef, name: &str) -> Option<String> {
        let state = self.state.lock();
        state
            .nodes
            .get(node.0)?
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    /// Replace the element's own text; this is a child-list mutation.
    pub fn set_text(&self, node: NodeRef, text: &str) {
        let mut state = self.state.lock();
        let Some(n) = state.nodes.get_mut(node.0) else {
            return;
        };
        n.text = text.to_string();
        if n.connected {
            state.notify_mutation();
        }
    }

    pub fn is_connected(&self, node: NodeRef) -> bool {
        self.state
            .lock()
            .nodes
            .get(node.0)
            .map(|n| n.connected)
            .unwrap_or(false)
    }

    /// Run `handler` whenever `node` is clicked.
    pub fn on_click<F>(&self, node: NodeRef, handler: F)
    where
        F: Fn(&MemoryPage, NodeRef) + Send + Sync + 'static,
    {
        self.state
            .lock()
            .click_handlers
            .insert(node.0, Arc::new(handler));
    }

    /// Dispatch a `play` event to capturing document listeners.
    pub fn fire_play(&self) {
        self.state
            .lock()
            .play_listeners
            .retain(|tx| tx.send(PageSignal::PlaybackStarted).is_ok());
    }

    /// Every click dispatched so far, in order.
    pub fn clicks(&self) -> Vec<NodeRef> {
        self.state.lock().clicks.clone()
    }

    pub fn click_count(&self) -> usize {
        self.state.lock().clicks.len()
    }

    pub fn observer_count(&self) -> usize {
        self.state.lock().observers.len()
    }

    pub fn play_listener_count(&self) -> usize {
        self.state.lock().play_listeners.len()
    }

    /// How many times callers released their handles.
    pub fn release_count(&self) -> usize {
        self.state.lock().handle_releases
    }
}

#[async_trait]
impl PageDom for MemoryPage {
    type Handle = NodeRef;

    async fn query_selector(&self, selector: &str) -> DomResult<Option<NodeRef>> {
        let selector = Selector::parse(selector)?;
        let state = self.state.lock();
        let root = self.document_element().0;
        let found = std::iter::once(root)
            .chain(state.descendants(root))
            .find(|idx| state.matches(*idx, &selector));
        Ok(found.map(NodeRef))
    }

    async fn query_selector_all(&self, scope: &NodeRef, selector: &str) -> DomResult<Vec<NodeRef>> {
        let selector = Selector::parse(selector)?;
        let state = self.state.lock();
        state.node(*scope)?;
        Ok(state
            .descendants(scope.0)
            .into_iter()
            .filter(|idx| state.matches(*idx, &selector))
            .map(NodeRef)
            .collect())
    }

    async fn text_content(&self, node: &NodeRef) -> DomResult<String> {
        let state = self.state.lock();
        state.node(*node)?;
        Ok(state.text_of(node.0))
    }

    async fn attribute(&self, node: &NodeRef, name: &str) -> DomResult<Option<String>> {
        let state = self.state.lock();
        Ok(state
            .node(*node)?
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone()))
    }

    async fn closest(&self, node: &NodeRef, selector: &str) -> DomResult<Option<NodeRef>> {
        let selector = Selector::parse(selector)?;
        let state = self.state.lock();
        state.node(*node)?;
        let mut current = Some(node.0);
        while let Some(idx) = current {
            if state.matches(idx, &selector) {
                return Ok(Some(NodeRef(idx)));
            }
            current = state.nodes[idx].parent;
        }
        Ok(None)
    }

    async fn element_by_id(&self, id: &str) -> DomResult<Option<NodeRef>> {
        let state = self.state.lock();
        let root = self.document_element().0;
        let found = std::iter::once(root)
            .chain(state.descendants(root))
            .find(|idx| {
                state.nodes[*idx]
                    .attrs
                    .iter()
                    .any(|(k, v)| k == "id" && v == id)
            });
        Ok(found.map(NodeRef))
    }

    async fn click(&self, node: &NodeRef) -> DomResult<()> {
        let handler = {
            let mut state = self.state.lock();
            state.node(*node)?;
            state.clicks.push(*node);
            state.click_handlers.get(&node.0).cloned()
        };
        if let Some(handler) = handler {
            handler(self, *node);
        }
        Ok(())
    }

    async fn release_handles(&self) -> DomResult<()> {
        self.state.lock().handle_releases += 1;
        Ok(())
    }
}

#[async_trait]
impl SignalSource for MemoryPage {
    async fn attach(&self, tx: mpsc::UnboundedSender<PageSignal>) -> DomResult<()> {
        let mut state = self.state.lock();
        state.observers.push(tx.clone());
        state.play_listeners.push(tx);
        Ok(())
    }

    async fn detach(&self) -> DomResult<()> {
        let mut state = self.state.lock();
        state.observers.clear();
        state.play_listeners.clear();
        Ok(())
    }
}
