//! Keydeck
//!
//! Binds physical button presses on a USB HID macropad to two kinds of
//! actions: synthetic keyboard shortcuts injected into the OS, and JSON
//! command messages broadcast to a creative-tooling panel over a local
//! WebSocket. Button maps are scoped per focused application, with the
//! reserved `"default"` map as fallback.
//!
//! # Architecture
//! - All routing decisions run on one control loop ([`app::App`]) fed by a
//!   single event channel
//! - The HID read loop, focus poller, and keystroke injector live on
//!   dedicated threads and only ever send events
//! - Output channels are fire-and-forget; their failures are logged, never
//!   propagated back into routing

pub mod app;
pub mod core;
pub mod dispatch;
pub mod focus;
pub mod hid;
pub mod inject;
pub mod panel;
pub mod router;
pub mod shortcut;

pub use app::{App, EditSurface};
pub use core::config::Config;
pub use core::error::{ConfigMutationError, DispatchError, EditError};
pub use core::events::{AppEvent, EditRequest, EventSender, StatusEvent};
pub use router::{
    Action, ApplicationConfig, ButtonAction, ButtonConfig, ButtonUpdate, Router, StoreSnapshot,
    DEFAULT_APP,
};
pub use shortcut::{compile, KeyToken};
