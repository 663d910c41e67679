//! Mock of the supported player's popover quality menu.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::page::{ElementSpec, MemoryPage, NodeRef};

const DEFAULT_TRIGGER_ID: &str = "reka-popover-trigger-v-0-1";

struct PlayerState {
    labels: Vec<String>,
    trigger_id: String,
    mount_delay: Duration,
    trigger: Option<NodeRef>,
    dialog: Option<NodeRef>,
    selections: Vec<String>,
}

/// Recreates the player markup on a [`MemoryPage`]:
///
/// ```html
/// <button id="reka-popover-trigger-…" aria-haspopup="dialog" aria-expanded="false"></button>
/// <div role="dialog" aria-labelledby="reka-popover-trigger-…">
///   <ul class="quality-selector">
///     <li class="quality-selector__item">1080p60</li>
///   </ul>
/// </div>
/// ```
///
/// Clicking the trigger toggles the popover; the dialog mounts after the
/// configured delay. Clicking an item records it as the player's selection.
#[derive(Clone)]
pub struct MockPlayer {
    page: MemoryPage,
    state: Arc<Mutex<PlayerState>>,
}

impl MockPlayer {
    pub fn new<S: AsRef<str>>(page: MemoryPage, labels: &[S]) -> Self {
        Self {
            page,
            state: Arc::new(Mutex::new(PlayerState {
                labels: labels.iter().map(|l| l.as_ref().to_string()).collect(),
                trigger_id: DEFAULT_TRIGGER_ID.to_string(),
                mount_delay: Duration::ZERO,
                trigger: None,
                dialog: None,
                selections: Vec::new(),
            })),
        }
    }

    /// Delay between opening the trigger and the dialog appearing.
    pub fn with_mount_delay(self, delay: Duration) -> Self {
        self.state.lock().mount_delay = delay;
        self
    }

    pub fn with_trigger_id(self, id: &str) -> Self {
        self.state.lock().trigger_id = id.to_string();
        self
    }

    pub fn page(&self) -> &MemoryPage {
        &self.page
    }

    /// Insert the player controls into the page body.
    pub fn install(&self) -> NodeRef {
        let trigger_id = self.state.lock().trigger_id.clone();
        let controls = self
            .page
            .append(self.page.body(), ElementSpec::new("div").class("player-controls"));
        let trigger = self.page.append(
            controls,
            ElementSpec::new("button")
                .id(&trigger_id)
                .attr("aria-haspopup", "dialog")
                .attr("aria-expanded", "false")
                .class("quality-button"),
        );
        self.state.lock().trigger = Some(trigger);

        let player = self.clone();
        self.page.on_click(trigger, move |_, _| player.toggle());
        trigger
    }

    pub fn trigger(&self) -> Option<NodeRef> {
        self.state.lock().trigger
    }

    pub fn is_expanded(&self) -> bool {
        self.trigger()
            .and_then(|t| self.page.get_attribute(t, "aria-expanded"))
            .as_deref()
            == Some("true")
    }

    /// Open the popover immediately, as if the user had done it.
    pub fn open_now(&self) {
        if let Some(trigger) = self.trigger() {
            self.page.set_attribute(trigger, "aria-expanded", "true");
        }
        self.mount_menu();
    }

    fn toggle(&self) {
        let Some(trigger) = self.trigger() else {
            return;
        };
        if self.is_expanded() {
            self.page.set_attribute(trigger, "aria-expanded", "false");
            self.unmount_menu();
            return;
        }

        self.page.set_attribute(trigger, "aria-expanded", "true");
        let delay = self.state.lock().mount_delay;
        if delay.is_zero() {
            self.mount_menu();
        } else {
            let player = self.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if player.is_expanded() {
                    player.mount_menu();
                }
            });
        }
    }

    /// Mount the dialog with the configured labels.
    pub fn mount_menu(&self) -> NodeRef {
        let labels = self.state.lock().labels.clone();
        self.mount_menu_with(&labels)
    }

    /// Mount the dialog with `labels`; an empty slice mounts a bare list.
    pub fn mount_menu_with<S: AsRef<str>>(&self, labels: &[S]) -> NodeRef {
        self.unmount_menu();
        let trigger_id = self.state.lock().trigger_id.clone();
        let dialog = self.page.append(
            self.page.body(),
            ElementSpec::new("div")
                .attr("role", "dialog")
                .attr("aria-labelledby", &trigger_id),
        );
        let list = self
            .page
            .append(dialog, ElementSpec::new("ul").class("quality-selector"));
        for label in labels {
            self.add_item(list, label.as_ref());
        }
        self.state.lock().dialog = Some(dialog);
        list
    }

    /// Append one entry to a mounted list.
    pub fn add_item(&self, list: NodeRef, label: &str) -> NodeRef {
        let item = self.page.append(
            list,
            ElementSpec::new("li")
                .class("quality-selector__item")
                .text(&format!("\n  {}\n", label)),
        );
        let player = self.clone();
        let label = label.to_string();
        self.page.on_click(item, move |_, _| {
            player.state.lock().selections.push(label.clone());
        });
        item
    }

    pub fn unmount_menu(&self) {
        let dialog = self.state.lock().dialog.take();
        if let Some(dialog) = dialog {
            self.page.remove(dialog);
        }
    }

    /// Labels chosen through item clicks, in order.
    pub fn selections(&self) -> Vec<String> {
        self.state.lock().selections.clone()
    }

    pub fn selected(&self) -> Option<String> {
        self.state.lock().selections.last().cloned()
    }
}
