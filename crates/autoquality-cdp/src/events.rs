//! Classification of page session events.

use crate::protocol::CdpResponse;

/// Page events the runner reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// A page script called a `Runtime` binding.
    BindingCalled { name: String, payload: String },
    /// `load` fired for a new document.
    Loaded,
    /// The top-level frame committed a navigation.
    MainFrameNavigated { url: String },
    /// Anything else, by method name.
    Other(String),
}

impl PageEvent {
    /// Classify a session event. Returns `None` for command responses.
    pub fn classify(resp: &CdpResponse) -> Option<Self> {
        let method = resp.method.as_deref()?;
        let params = resp.params.as_ref();
        let str_param = |key: &str| {
            params
                .and_then(|p| p.get(key))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };

        let event = match method {
            "Runtime.bindingCalled" => match (str_param("name"), str_param("payload")) {
                (Some(name), Some(payload)) => PageEvent::BindingCalled { name, payload },
                _ => PageEvent::Other(method.to_string()),
            },
            "Page.loadEventFired" => PageEvent::Loaded,
            "Page.frameNavigated" => {
                let frame = params.and_then(|p| p.get("frame"));
                let is_main = frame.is_some_and(|f| f.get("parentId").is_none());
                let url = frame
                    .and_then(|f| f.get("url"))
                    .and_then(|u| u.as_str());
                match url {
                    Some(url) if is_main => PageEvent::MainFrameNavigated {
                        url: url.to_string(),
                    },
                    _ => PageEvent::Other(method.to_string()),
                }
            }
            other => PageEvent::Other(other.to_string()),
        };
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(json: &str) -> CdpResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_binding_called() {
        let resp = event(
            r#"{"method": "Runtime.bindingCalled", "sessionId": "S",
                "params": {"name": "__autoqualitySignal", "payload": "play", "executionContextId": 3}}"#,
        );
        assert_eq!(
            PageEvent::classify(&resp),
            Some(PageEvent::BindingCalled {
                name: "__autoqualitySignal".to_string(),
                payload: "play".to_string(),
            })
        );
    }

    #[test]
    fn test_load_event() {
        let resp = event(r#"{"method": "Page.loadEventFired", "params": {"timestamp": 1.5}}"#);
        assert_eq!(PageEvent::classify(&resp), Some(PageEvent::Loaded));
    }

    #[test]
    fn test_main_frame_navigation() {
        let resp = event(
            r#"{"method": "Page.frameNavigated",
                "params": {"frame": {"id": "F1", "url": "https://w.tv/other"}}}"#,
        );
        assert_eq!(
            PageEvent::classify(&resp),
            Some(PageEvent::MainFrameNavigated {
                url: "https://w.tv/other".to_string()
            })
        );
    }

    #[test]
    fn test_child_frame_navigation_is_other() {
        let resp = event(
            r#"{"method": "Page.frameNavigated",
                "params": {"frame": {"id": "F2", "parentId": "F1", "url": "https://ads.example/"}}}"#,
        );
        assert_eq!(
            PageEvent::classify(&resp),
            Some(PageEvent::Other("Page.frameNavigated".to_string()))
        );
    }

    #[test]
    fn test_response_is_not_an_event() {
        let resp = event(r#"{"id": 4, "result": {}}"#);
        assert_eq!(PageEvent::classify(&resp), None);
    }
}
