//! In-process page model.
//!
//! [`MemoryPage`] is a small element tree implementing [`PageDom`] and
//! [`SignalSource`]: child-list changes notify registered observers, `play`
//! can be fired by hand, and every click is logged. [`MockPlayer`] builds
//! the popover quality menu of the supported player on top of it.
//!
//! [`PageDom`]: crate::PageDom
//! [`SignalSource`]: crate::SignalSource

mod page;
mod player;
mod selector;

pub use page::{ElementSpec, MemoryPage, NodeRef};
pub use player::MockPlayer;
pub use selector::Selector;
