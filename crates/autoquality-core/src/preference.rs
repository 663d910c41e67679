//! The ordered preference table.

use std::sync::Arc;

use crate::label::QualityLabel;

/// Built-in preference order, most preferred first. `Auto` is the fallback.
pub const DEFAULT_PREFERENCES: &[&str] = &[
    "2160p60", "2160p", "1440p60", "1440p", "1080p60", "1080p50", "1050p60", "1050p", "1032p60",
    "1080p", "1032p", "900p60", "900p", "720p60", "720p", "480p", "360p", "160p", "Auto",
];

/// Immutable, priority-ordered list of label patterns.
///
/// Cloning is cheap; every clone shares the same entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceList {
    entries: Arc<[QualityLabel]>,
}

impl PreferenceList {
    /// Build a table from raw patterns. Patterns are normalized and empty
    /// ones are dropped, since an empty pattern would match every label.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries: Vec<QualityLabel> = patterns
            .into_iter()
            .map(QualityLabel::new)
            .filter(|label| !label.is_empty())
            .collect();
        Self {
            entries: entries.into(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &QualityLabel> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The least preferred entry, conventionally `Auto`.
    pub fn fallback(&self) -> Option<&QualityLabel> {
        self.entries.last()
    }

    /// Position of a pattern in the table.
    pub fn rank(&self, pattern: &QualityLabel) -> Option<usize> {
        self.entries.iter().position(|p| p == pattern)
    }
}

impl Default for PreferenceList {
    fn default() -> Self {
        Self::new(DEFAULT_PREFERENCES.iter().copied())
    }
}
