//! Structural signatures of the host player's markup.

use std::fmt::Debug;

/// Where the quality menu, its items and its trigger live in the document.
pub trait LocatorStrategy: Debug + Send + Sync {
    /// Selector for the list container of the quality menu.
    fn container(&self) -> &str;

    /// Selector for selectable entries inside the container.
    fn item(&self) -> &str;

    /// Selector for the popover trigger button.
    fn trigger(&self) -> &str;

    /// Selector for the dialog wrapping an open menu.
    fn dialog(&self) -> &str;

    /// Attribute on the dialog holding the trigger's id.
    fn dialog_label_attribute(&self) -> &str;

    /// Attribute on the trigger reporting its open state.
    fn expanded_attribute(&self) -> &str;
}

/// CSS-selector based locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssLocator {
    pub container: String,
    pub item: String,
    pub trigger: String,
    pub dialog: String,
    pub dialog_label_attribute: String,
    pub expanded_attribute: String,
}

impl Default for CssLocator {
    fn default() -> Self {
        Self {
            container: "ul.quality-selector".to_string(),
            item: "li.quality-selector__item".to_string(),
            trigger: r#"button[aria-haspopup="dialog"][id^="reka-popover-trigger"]"#.to_string(),
            dialog: r#"[role="dialog"][aria-labelledby]"#.to_string(),
            dialog_label_attribute: "aria-labelledby".to_string(),
            expanded_attribute: "aria-expanded".to_string(),
        }
    }
}

impl LocatorStrategy for CssLocator {
    fn container(&self) -> &str {
        &self.container
    }

    fn item(&self) -> &str {
        &self.item
    }

    fn trigger(&self) -> &str {
        &self.trigger
    }

    fn dialog(&self) -> &str {
        &self.dialog
    }

    fn dialog_label_attribute(&self) -> &str {
        &self.dialog_label_attribute
    }

    fn expanded_attribute(&self) -> &str {
        &self.expanded_attribute
    }
}
