//! Quality labels as shown by the player.

use std::fmt;

/// Collapse every whitespace run to a single space and trim both ends.
pub fn normalize_label(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A normalized rendition descriptor such as `1080p60` or `Auto`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct QualityLabel(String);

impl QualityLabel {
    /// Build a label from raw display text.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(normalize_label(raw.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether this label contains `pattern` as a substring.
    pub fn contains(&self, pattern: &QualityLabel) -> bool {
        self.0.contains(pattern.as_str())
    }
}

impl fmt::Display for QualityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QualityLabel {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for QualityLabel {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl PartialEq<str> for QualityLabel {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for QualityLabel {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
