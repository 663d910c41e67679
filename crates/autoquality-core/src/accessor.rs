//! Menu accessor: finds the quality menu, its items and its trigger.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::dom::PageDom;
use crate::error::DomResult;
use crate::label::QualityLabel;
use crate::locator::LocatorStrategy;
use crate::matcher::MenuItem;

/// The menu as mounted at one instant.
///
/// Never held across an await that yields to the page: the host may replace
/// or remove any of these elements at any time.
#[derive(Debug)]
pub struct MenuSnapshot<H> {
    pub container: H,
    pub items: Vec<MenuItem<H>>,
}

/// Locates and drives the quality menu of one page.
pub struct MenuAccessor<D: PageDom> {
    dom: Arc<D>,
    locator: Arc<dyn LocatorStrategy>,
}

impl<D: PageDom> Clone for MenuAccessor<D> {
    fn clone(&self) -> Self {
        Self {
            dom: self.dom.clone(),
            locator: self.locator.clone(),
        }
    }
}

impl<D: PageDom> MenuAccessor<D> {
    pub fn new(dom: Arc<D>, locator: Arc<dyn LocatorStrategy>) -> Self {
        Self { dom, locator }
    }

    pub fn dom(&self) -> &Arc<D> {
        &self.dom
    }

    pub fn locator(&self) -> &dyn LocatorStrategy {
        self.locator.as_ref()
    }

    /// The mounted menu container, if any.
    pub async fn find_menu_container(&self) -> DomResult<Option<D::Handle>> {
        self.dom.query_selector(self.locator.container()).await
    }

    /// Mounted entries of `container` with their normalized text.
    pub async fn list_items(&self, container: &D::Handle) -> DomResult<Vec<MenuItem<D::Handle>>> {
        let handles = self
            .dom
            .query_selector_all(container, self.locator.item())
            .await?;

        let mut items = Vec::with_capacity(handles.len());
        for handle in handles {
            let text = self.dom.text_content(&handle).await?;
            items.push(MenuItem::new(QualityLabel::new(text), handle));
        }
        Ok(items)
    }

    /// Container plus items, or `None` when no menu is mounted.
    pub async fn snapshot(&self) -> DomResult<Option<MenuSnapshot<D::Handle>>> {
        let Some(container) = self.find_menu_container().await? else {
            return Ok(None);
        };
        let items = self.list_items(&container).await?;
        Ok(Some(MenuSnapshot { container, items }))
    }

    /// Click a menu entry. Returns whether the click was dispatched.
    pub async fn click_item(&self, item: &MenuItem<D::Handle>) -> bool {
        match self.dom.click(&item.handle).await {
            Ok(()) => {
                debug!(label = %item.label, "Clicked quality item");
                true
            }
            Err(e) => {
                warn!(label = %item.label, "Failed to click quality item: {}", e);
                false
            }
        }
    }

    /// The control that opens the menu.
    ///
    /// When a menu is mounted its dialog names the trigger directly; otherwise
    /// the fixed trigger signature is used.
    pub async fn find_trigger_control(&self) -> DomResult<Option<D::Handle>> {
        if let Some(container) = self.find_menu_container().await? {
            if let Some(trigger) = self.trigger_for_menu(&container).await? {
                return Ok(Some(trigger));
            }
        }
        self.dom.query_selector(self.locator.trigger()).await
    }

    /// Follow the dialog association from a menu container to its trigger.
    pub async fn trigger_for_menu(&self, container: &D::Handle) -> DomResult<Option<D::Handle>> {
        let Some(dialog) = self.dom.closest(container, self.locator.dialog()).await? else {
            return Ok(None);
        };

        let trigger_id = self
            .dom
            .attribute(&dialog, self.locator.dialog_label_attribute())
            .await?;

        match trigger_id {
            Some(id) if !id.is_empty() => self.dom.element_by_id(&id).await,
            _ => Ok(None),
        }
    }

    /// Whether the trigger reports the menu as open.
    pub async fn is_menu_expanded(&self, control: &D::Handle) -> DomResult<bool> {
        let state = self
            .dom
            .attribute(control, self.locator.expanded_attribute())
            .await?;
        Ok(state.as_deref() == Some("true"))
    }

    /// Release the handles read so far; failures only cost memory.
    pub async fn release_handles(&self) {
        if let Err(e) = self.dom.release_handles().await {
            debug!("Failed to release page handles: {}", e);
        }
    }

    /// Click the trigger unless it already reports expanded; clicking an
    /// open trigger would close the menu. Returns whether a click was sent.
    pub async fn open_menu(&self, control: &D::Handle) -> DomResult<bool> {
        if self.is_menu_expanded(control).await? {
            return Ok(false);
        }
        self.dom.click(control).await?;
        debug!("Clicked quality menu trigger");
        Ok(true)
    }
}

#[cfg(test)]
#[path = "accessor_tests.rs"]
mod tests;
