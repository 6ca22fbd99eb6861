//! Router module - per-application button maps and hardware-code resolution

mod button;
mod store;

pub use button::{Action, ButtonAction, ButtonConfig, ButtonUpdate};
pub use store::{ApplicationConfig, Router, StoreSnapshot, DEFAULT_APP};
