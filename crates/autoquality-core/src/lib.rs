//! # autoquality core
//!
//! Picks the best rendition offered by a video player's quality menu and
//! selects it exactly once per page load.
//!
//! ## Architecture
//!
//! ```text
//! ActivationWatcher ──► SelectionOrchestrator ──► MenuAccessor ──► PageDom
//!   (signals)             (retry + single flight)   (locators)      (CDP / memory)
//!                                │
//!                                └──► LabelMatcher ──► PreferenceList
//! ```
//!
//! The page itself is abstract: anything implementing [`PageDom`] and
//! [`SignalSource`] can be driven. `autoquality-cdp` provides a Chrome
//! DevTools implementation; [`memory::MemoryPage`] is an in-process page
//! model used by tests and the `simulate` command.

mod accessor;
mod dom;
mod error;
mod label;
mod locator;
mod matcher;
pub mod memory;
mod orchestrator;
mod preference;
mod session;
mod watcher;

pub use accessor::{MenuAccessor, MenuSnapshot};
pub use dom::{PageDom, PageSignal, SignalSource};
pub use error::{DomError, DomResult};
pub use label::{QualityLabel, normalize_label};
pub use locator::{CssLocator, LocatorStrategy};
pub use matcher::{LabelMatch, LabelMatcher, MatchKind, MenuItem};
pub use orchestrator::{AttemptOutcome, DEFAULT_RETRY_DELAYS_MS, RetrySchedule, SelectionOrchestrator};
pub use preference::{DEFAULT_PREFERENCES, PreferenceList};
pub use session::{AttemptGuard, SelectionSession};
pub use watcher::{ActivationWatcher, WatchReport, WatcherHandles};

// Re-export CancellationToken for convenience
pub use tokio_util::sync::CancellationToken;
