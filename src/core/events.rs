//! Application event definitions
//!
//! Every input source (HID read loop, focus tracker, panel server, edit
//! surface) feeds the single control loop through one `AppEvent` channel, so
//! routing decisions and store mutations are always serialized.

use super::error::ConfigMutationError;
use crate::router::{ButtonUpdate, StoreSnapshot};
use tokio::sync::{mpsc, oneshot};

/// Sender half of the application event bus
pub type EventSender = mpsc::UnboundedSender<AppEvent>;

/// Receiver half of the application event bus
pub type EventReceiver = mpsc::UnboundedReceiver<AppEvent>;

/// Application-wide events consumed by the control loop
#[derive(Debug)]
pub enum AppEvent {
    /// HID device connected
    DeviceConnected,

    /// HID device disconnected
    DeviceDisconnected,

    /// A physical button was pressed (first byte of the HID report)
    ButtonPressed { code: u8 },

    /// The foreground application changed
    FocusChanged { application: String, title: String },

    /// A panel client completed the WebSocket handshake
    PanelConnected {
        id: u64,
        tx: mpsc::UnboundedSender<String>,
    },

    /// A panel client went away
    PanelDisconnected { id: u64 },

    /// A request from the configuration-editing surface
    Edit(EditRequest),
}

/// Typed requests from the editing surface, each carrying its reply channel
#[derive(Debug)]
pub enum EditRequest {
    RegisterApplication {
        id: String,
        reply: oneshot::Sender<Result<(), ConfigMutationError>>,
    },
    UpdateButton {
        application: String,
        button: u8,
        update: ButtonUpdate,
        reply: oneshot::Sender<Result<(), ConfigMutationError>>,
    },
    /// Read a disposable copy of the whole store
    Snapshot {
        reply: oneshot::Sender<StoreSnapshot>,
    },
    /// Candidate application identities for the "add application" picker
    ApplicationCandidates {
        reply: oneshot::Sender<Vec<String>>,
    },
    SetActiveApplication {
        id: String,
    },
}

/// Notifications produced for the presentation layer
#[derive(Debug, Clone)]
pub enum StatusEvent {
    /// HID device connect state changed
    DeviceStatus { connected: bool },

    /// The focused application changed (deduplicated)
    FocusedApplication { application: String },

    /// A hardware code was resolved; `description` is display-ready
    ActionResolved { code: u8, description: String },
}
