//! Error taxonomies for the edit surface and the output channels

use thiserror::Error;

/// Rejection of a configuration mutation requested through the edit surface.
///
/// These are the only errors that propagate back to a caller; everything
/// that goes wrong in the output channels is logged and isolated instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigMutationError {
    /// `register_application` on an identity that already has a button map.
    /// The reserved `"default"` identity always exists, so registering it
    /// always fails with this variant.
    #[error("application \"{0}\" is already registered")]
    ApplicationExists(String),

    /// `update_button` on an identity with no button map
    #[error("unknown application \"{0}\"")]
    UnknownApplication(String),

    /// `update_button` on a button id outside the application's map
    #[error("application \"{application}\" has no button with id {button}")]
    UnknownButton { application: String, button: u8 },
}

/// Failure of an output channel while dispatching a resolved action.
///
/// Logged by the control loop; never fed back into routing.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("keystroke injection failed: {0}")]
    Keystroke(#[source] anyhow::Error),

    #[error("failed to encode remote command: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Error returned by [`EditSurface`](crate::app::EditSurface) calls.
#[derive(Debug, Error)]
pub enum EditError {
    /// The mutation was rejected by the router
    #[error(transparent)]
    Rejected(#[from] ConfigMutationError),

    /// The routing loop is no longer running
    #[error("routing context is not running")]
    Unavailable,
}
