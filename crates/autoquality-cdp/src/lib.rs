//! Chrome DevTools Protocol driver for autoquality.
//!
//! Connects to a Chrome/Chromium started with remote debugging and exposes
//! an attached tab as an autoquality page:
//!
//! ```text
//! ┌─────────────────┐    WebSocket     ┌──────────────────┐
//! │   autoquality   │ ◄──────────────► │   Chrome/Edge    │
//! │  (this crate)   │       CDP        │  (user's browser)│
//! └─────────────────┘                  └──────────────────┘
//! ```
//!
//! ## Setup
//!
//! ```bash
//! google-chrome --remote-debugging-port=9222
//! ```
//!
//! ## Page bridge
//!
//! - [`CdpDom`] implements `PageDom` with `Runtime` remote objects.
//! - [`CdpSignals`] implements `SignalSource` by injecting a
//!   `MutationObserver` and a capturing `play` listener that report back
//!   through a `Runtime` binding.
//! - [`PageEvent`] classifies the raw events of a page session.

mod client;
mod dom;
mod error;
mod events;
mod protocol;
mod session;
mod signals;

pub use client::CdpClient;
pub use dom::{CdpDom, OBJECT_GROUP, RemoteRef};
pub use error::CdpError;
pub use events::PageEvent;
pub use protocol::*;
pub use session::PageSession;
pub use signals::{CdpSignals, SIGNAL_BINDING, SignalRuntime};
