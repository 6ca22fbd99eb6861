//! HID module - USB HID communication with the macropad

mod listener;

pub use listener::HidListener;
