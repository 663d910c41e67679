//! Error types for page access.

use thiserror::Error;

/// Errors raised while reading from or acting on a page.
///
/// None of these are fatal to a selection attempt: the orchestrator treats
/// every variant as "menu not ready yet" and waits for the next signal.
#[derive(Debug, Error)]
pub enum DomError {
    /// The page connection is gone or refused the request.
    #[error("Page transport error: {0}")]
    Transport(String),

    /// A handle no longer refers to a live element.
    #[error("Stale element handle: {0}")]
    StaleHandle(String),

    /// Script evaluation inside the page threw.
    #[error("Page script error: {0}")]
    Script(String),

    /// The selector could not be parsed.
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
}

/// Result type for page operations.
pub type DomResult<T> = Result<T, DomError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DomError::StaleHandle("node-7".to_string());
        assert!(err.to_string().contains("node-7"));
        assert!(err.to_string().contains("Stale"));

        let err = DomError::InvalidSelector("ul..x".to_string());
        assert!(err.to_string().contains("ul..x"));
    }
}
