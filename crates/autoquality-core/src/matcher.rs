//! Label matching against the preference table.

use crate::label::QualityLabel;
use crate::preference::PreferenceList;

/// One selectable entry of the quality menu: its normalized text plus the
/// page handle used to click it.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem<H> {
    pub label: QualityLabel,
    pub handle: H,
}

impl<H> MenuItem<H> {
    pub fn new(label: impl Into<QualityLabel>, handle: H) -> Self {
        Self {
            label: label.into(),
            handle,
        }
    }
}

/// How an offered label satisfied a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Substring,
}

/// Result of a successful match.
#[derive(Debug)]
pub struct LabelMatch<'a, H> {
    pub item: &'a MenuItem<H>,
    pub pattern: &'a QualityLabel,
    pub rank: usize,
    pub kind: MatchKind,
}

/// Picks the best offered item per a [`PreferenceList`].
#[derive(Debug, Clone, Default)]
pub struct LabelMatcher {
    preferences: PreferenceList,
}

impl LabelMatcher {
    pub fn new(preferences: PreferenceList) -> Self {
        Self { preferences }
    }

    pub fn preferences(&self) -> &PreferenceList {
        &self.preferences
    }

    /// Walk the preference table in order. For each pattern an exact match
    /// is tried first, then the first offered label (in menu order) that
    /// contains the pattern. The first pattern that matches at all wins, so
    /// an earlier pattern's substring hit beats a later pattern's exact hit.
    pub fn select_best<'a, H>(&'a self, offered: &'a [MenuItem<H>]) -> Option<LabelMatch<'a, H>> {
        if offered.is_empty() {
            return None;
        }

        for (rank, pattern) in self.preferences.iter().enumerate() {
            if let Some(item) = offered.iter().find(|item| item.label == *pattern) {
                return Some(LabelMatch {
                    item,
                    pattern,
                    rank,
                    kind: MatchKind::Exact,
                });
            }

            if let Some(item) = offered.iter().find(|item| item.label.contains(pattern)) {
                return Some(LabelMatch {
                    item,
                    pattern,
                    rank,
                    kind: MatchKind::Substring,
                });
            }
        }

        None
    }
}

#[cfg(test)]
#[path = "matcher_tests.rs"]
mod tests;
