//! `PageDom` over CDP `Runtime` remote objects.

use std::sync::Arc;

use async_trait::async_trait;
use autoquality_core::{DomResult, PageDom};
use serde_json::{Value, json};
use tracing::trace;

use crate::error::CdpError;
use crate::protocol::RemoteObject;
use crate::session::PageSession;

/// Object group for every element handle handed out by [`CdpDom`].
pub const OBJECT_GROUP: &str = "autoquality";

const QUERY_ALL: &str = "function(selector) { return Array.from(this.querySelectorAll(selector)); }";
const TEXT_CONTENT: &str = "function() { return this.textContent ?? ''; }";
const GET_ATTRIBUTE: &str = "function(name) { return this.getAttribute(name); }";
const CLOSEST: &str = "function(selector) { return this.closest(selector); }";
const CLICK: &str = "function() { this.click(); }";

/// Remote element handle.
///
/// Becomes stale when the element's execution context goes away or the
/// object group is released.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteRef {
    object_id: Arc<str>,
}

impl RemoteRef {
    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    fn from_remote(obj: RemoteObject) -> Option<Self> {
        if obj.is_nullish() {
            return None;
        }
        obj.object_id.map(|id| Self {
            object_id: Arc::from(id),
        })
    }
}

/// Live document of an attached tab.
pub struct CdpDom {
    session: Arc<PageSession>,
}

impl CdpDom {
    pub fn new(session: Arc<PageSession>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Arc<PageSession> {
        &self.session
    }

    /// Drop every element handle handed out so far.
    pub async fn release(&self) -> Result<(), CdpError> {
        trace!(
            "Releasing object group {} for session {}",
            OBJECT_GROUP,
            self.session.session_id()
        );
        self.session.release_object_group(OBJECT_GROUP).await
    }

    async fn document_lookup(&self, call: &str, arg: &str) -> Result<Option<RemoteRef>, CdpError> {
        let expression = format!("document.{}({})", call, serde_json::to_string(arg)?);
        trace!("Evaluating {}", expression);
        let obj = self
            .session
            .evaluate_handle(&expression, OBJECT_GROUP)
            .await?;
        Ok(RemoteRef::from_remote(obj))
    }

    async fn handle_call(
        &self,
        node: &RemoteRef,
        function: &str,
        arg: &str,
    ) -> Result<Option<RemoteRef>, CdpError> {
        let obj = self
            .session
            .call_function_on_handle(
                node.object_id(),
                function,
                Some(vec![json!(arg)]),
                OBJECT_GROUP,
            )
            .await?;
        Ok(RemoteRef::from_remote(obj))
    }

    async fn query_all(&self, scope: &RemoteRef, selector: &str) -> Result<Vec<RemoteRef>, CdpError> {
        let Some(array) = self.handle_call(scope, QUERY_ALL, selector).await? else {
            return Ok(Vec::new());
        };

        let props = self.session.get_properties(array.object_id()).await;
        // The array itself is only a carrier for the element handles.
        let _ = self.session.release_object(array.object_id()).await;

        let mut indexed: Vec<(usize, RemoteRef)> = props?
            .into_iter()
            .filter_map(|p| {
                let index = p.name.parse::<usize>().ok()?;
                let node = RemoteRef::from_remote(p.value?)?;
                Some((index, node))
            })
            .collect();
        indexed.sort_by_key(|(index, _)| *index);
        Ok(indexed.into_iter().map(|(_, node)| node).collect())
    }
}

#[async_trait]
impl PageDom for CdpDom {
    type Handle = RemoteRef;

    async fn query_selector(&self, selector: &str) -> DomResult<Option<RemoteRef>> {
        Ok(self.document_lookup("querySelector", selector).await?)
    }

    async fn query_selector_all(&self, scope: &RemoteRef, selector: &str) -> DomResult<Vec<RemoteRef>> {
        Ok(self.query_all(scope, selector).await?)
    }

    async fn text_content(&self, node: &RemoteRef) -> DomResult<String> {
        let value = self
            .session
            .call_function_on(node.object_id(), TEXT_CONTENT, None)
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn attribute(&self, node: &RemoteRef, name: &str) -> DomResult<Option<String>> {
        let value = self
            .session
            .call_function_on(node.object_id(), GET_ATTRIBUTE, Some(vec![json!(name)]))
            .await?;
        Ok(match value {
            Value::String(s) => Some(s),
            _ => None,
        })
    }

    async fn closest(&self, node: &RemoteRef, selector: &str) -> DomResult<Option<RemoteRef>> {
        Ok(self.handle_call(node, CLOSEST, selector).await?)
    }

    async fn element_by_id(&self, id: &str) -> DomResult<Option<RemoteRef>> {
        Ok(self.document_lookup("getElementById", id).await?)
    }

    async fn click(&self, node: &RemoteRef) -> DomResult<()> {
        self.session
            .call_function_on(node.object_id(), CLICK, None)
            .await?;
        Ok(())
    }

    async fn release_handles(&self) -> DomResult<()> {
        Ok(self.release().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(json: &str) -> RemoteObject {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_remote_ref_from_element() {
        let node = RemoteRef::from_remote(remote(
            r#"{"type": "object", "subtype": "node", "objectId": "-123.4.5"}"#,
        ))
        .unwrap();
        assert_eq!(node.object_id(), "-123.4.5");
    }

    #[test]
    fn test_remote_ref_from_null_is_none() {
        assert!(RemoteRef::from_remote(remote(r#"{"type": "object", "subtype": "null"}"#)).is_none());
        assert!(RemoteRef::from_remote(remote(r#"{"type": "undefined"}"#)).is_none());
    }

    #[test]
    fn test_remote_ref_without_object_id_is_none() {
        assert!(RemoteRef::from_remote(remote(r#"{"type": "string", "value": "x"}"#)).is_none());
    }
}
