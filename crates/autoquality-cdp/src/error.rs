//! CDP error types.

use autoquality_core::DomError;
use thiserror::Error;

/// CDP client errors.
#[derive(Debug, Error)]
pub enum CdpError {
    /// Failed to connect to Chrome.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Chrome not found or not running with remote debugging.
    #[error("Chrome not available at {0}. Start Chrome with: chrome --remote-debugging-port=9222")]
    ChromeNotAvailable(String),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// CDP protocol error.
    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error (for endpoint discovery).
    #[error("HTTP error: {0}")]
    Http(String),

    /// JavaScript execution error.
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    /// Timeout.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Session closed.
    #[error("Session closed")]
    SessionClosed,

    /// Invalid response.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Http(e.to_string())
    }
}

impl From<url::ParseError> for CdpError {
    fn from(e: url::ParseError) -> Self {
        CdpError::ConnectionFailed(format!("Invalid URL: {}", e))
    }
}

impl From<CdpError> for DomError {
    fn from(e: CdpError) -> Self {
        match e {
            CdpError::JavaScript(message) if message.contains("is not a valid selector") => {
                DomError::InvalidSelector(message)
            }
            CdpError::JavaScript(message) => DomError::Script(message),
            CdpError::Protocol { message, .. }
                if message.contains("Could not find object")
                    || message.contains("Cannot find context") =>
            {
                DomError::StaleHandle(message)
            }
            other => DomError::Transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dom_error_mapping() {
        let stale = CdpError::Protocol {
            code: -32000,
            message: "Could not find object with given id".to_string(),
        };
        assert!(matches!(DomError::from(stale), DomError::StaleHandle(_)));

        let script = CdpError::JavaScript("Uncaught TypeError".to_string());
        assert!(matches!(DomError::from(script), DomError::Script(_)));

        let selector = CdpError::JavaScript(
            "SyntaxError: Failed to execute 'querySelector' on 'Document': 'ul[' is not a valid selector."
                .to_string(),
        );
        assert!(matches!(DomError::from(selector), DomError::InvalidSelector(_)));

        let closed = DomError::from(CdpError::SessionClosed);
        assert!(matches!(closed, DomError::Transport(ref m) if m.contains("Session closed")));
    }

    #[test]
    fn test_url_error_is_connection_failure() {
        let err = CdpError::from(url::Url::parse("not a url").unwrap_err());
        assert!(err.to_string().contains("Invalid URL"));
    }
}
