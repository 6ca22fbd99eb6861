//! Control context - the single-threaded owner of routing state
//!
//! `App` is constructed once at process start and consumes every event
//! source through one channel, so the router's state is never observed
//! mid-mutation. Output channel failures are logged here and never affect
//! subsequent resolutions. `EditSurface` is the handle the presentation
//! layer uses to read and mutate the store.

use crate::core::config::Config;
use crate::core::error::{ConfigMutationError, EditError};
use crate::core::events::{AppEvent, EditRequest, EventReceiver, EventSender, StatusEvent};
use crate::dispatch::{Dispatcher, KeySink};
use crate::focus;
use crate::router::{ButtonUpdate, Router, StoreSnapshot};
use tokio::sync::{broadcast, oneshot};
use tracing::{info, warn};

/// Buffered status notifications before the oldest is dropped
const STATUS_CHANNEL_CAPACITY: usize = 64;

/// The owning context for the router, dispatcher, and status notifications
pub struct App {
    router: Router,
    dispatcher: Dispatcher,
    status_tx: broadcast::Sender<StatusEvent>,
}

impl App {
    pub fn new(config: &Config, keys: Box<dyn KeySink>) -> Self {
        let (status_tx, _) = broadcast::channel(STATUS_CHANNEL_CAPACITY);
        Self {
            router: Router::new(config.hid.button_count),
            dispatcher: Dispatcher::new(keys),
            status_tx,
        }
    }

    /// Subscribe to status notifications for the presentation layer
    pub fn subscribe_status(&self) -> broadcast::Receiver<StatusEvent> {
        self.status_tx.subscribe()
    }

    /// Consume events until every sender is gone
    pub async fn run(mut self, mut rx: EventReceiver) {
        info!("Routing loop started");
        while let Some(event) = rx.recv().await {
            self.handle_event(event);
        }
        info!("Routing loop stopped");
    }

    /// Process one application event
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::ButtonPressed { code } => self.handle_button_press(code),
            AppEvent::FocusChanged { application, title } => {
                if self.router.set_active_application(&application) {
                    info!("Focused application: {} ({:?})", application, title);
                    let _ = self
                        .status_tx
                        .send(StatusEvent::FocusedApplication { application });
                }
            }
            AppEvent::DeviceConnected => {
                info!("Macropad connected");
                let _ = self
                    .status_tx
                    .send(StatusEvent::DeviceStatus { connected: true });
            }
            AppEvent::DeviceDisconnected => {
                info!("Macropad disconnected");
                let _ = self
                    .status_tx
                    .send(StatusEvent::DeviceStatus { connected: false });
            }
            AppEvent::PanelConnected { id, tx } => {
                self.dispatcher.add_panel_client(id, tx);
                info!(
                    "Panel client {} registered ({} connected)",
                    id,
                    self.dispatcher.panel_client_count()
                );
            }
            AppEvent::PanelDisconnected { id } => {
                self.dispatcher.remove_panel_client(id);
            }
            AppEvent::Edit(request) => self.handle_edit(request),
        }
    }

    fn handle_button_press(&mut self, code: u8) {
        let application = self.router.active_application().to_string();
        let action = self.router.resolve(code, &application);
        let description = match self.router.resolve_button(code, &application) {
            Some(button) => button.label(),
            None => format!("Unassigned - HID code: {}", code),
        };
        info!("Button {} in {:?}: {}", code, application, description);
        let _ = self
            .status_tx
            .send(StatusEvent::ActionResolved { code, description });

        // Channel failures stay here; routing never sees them
        if let Err(e) = self.dispatcher.dispatch(&action) {
            warn!("Dispatch failed for code {}: {}", code, e);
        }
    }

    fn handle_edit(&mut self, request: EditRequest) {
        match request {
            EditRequest::RegisterApplication { id, reply } => {
                let _ = reply.send(self.router.register_application(&id));
            }
            EditRequest::UpdateButton {
                application,
                button,
                update,
                reply,
            } => {
                let _ = reply.send(self.router.update_button(&application, button, update));
            }
            EditRequest::Snapshot { reply } => {
                let _ = reply.send(self.router.snapshot());
            }
            EditRequest::ApplicationCandidates { reply } => {
                let candidates = match focus::list_window_owners() {
                    Ok(owners) => owners,
                    Err(e) => {
                        warn!("Window enumeration failed, using observed set: {}", e);
                        self.router.observed_applications()
                    }
                };
                let _ = reply.send(candidates);
            }
            EditRequest::SetActiveApplication { id } => {
                if self.router.set_active_application(&id) {
                    let _ = self
                        .status_tx
                        .send(StatusEvent::FocusedApplication { application: id });
                }
            }
        }
    }
}

/// Cloneable handle exposing the configuration-edit contract to the
/// presentation layer. Mutations are rejected synchronously from the
/// caller's point of view; reads return disposable snapshots.
#[derive(Clone)]
pub struct EditSurface {
    tx: EventSender,
}

impl EditSurface {
    pub fn new(tx: EventSender) -> Self {
        Self { tx }
    }

    pub async fn register_application(&self, id: impl Into<String>) -> Result<(), EditError> {
        let (reply, rx) = oneshot::channel();
        self.send(AppEvent::Edit(EditRequest::RegisterApplication {
            id: id.into(),
            reply,
        }))?;
        Self::rejection(rx.await)
    }

    pub async fn update_button(
        &self,
        application: impl Into<String>,
        button: u8,
        update: ButtonUpdate,
    ) -> Result<(), EditError> {
        let (reply, rx) = oneshot::channel();
        self.send(AppEvent::Edit(EditRequest::UpdateButton {
            application: application.into(),
            button,
            update,
            reply,
        }))?;
        Self::rejection(rx.await)
    }

    pub async fn snapshot(&self) -> Result<StoreSnapshot, EditError> {
        let (reply, rx) = oneshot::channel();
        self.send(AppEvent::Edit(EditRequest::Snapshot { reply }))?;
        rx.await.map_err(|_| EditError::Unavailable)
    }

    pub async fn application_candidates(&self) -> Result<Vec<String>, EditError> {
        let (reply, rx) = oneshot::channel();
        self.send(AppEvent::Edit(EditRequest::ApplicationCandidates { reply }))?;
        rx.await.map_err(|_| EditError::Unavailable)
    }

    /// Fire-and-forget; the router deduplicates consecutive identities
    pub fn set_active_application(&self, id: impl Into<String>) -> Result<(), EditError> {
        self.send(AppEvent::Edit(EditRequest::SetActiveApplication {
            id: id.into(),
        }))
    }

    fn send(&self, event: AppEvent) -> Result<(), EditError> {
        self.tx.send(event).map_err(|_| EditError::Unavailable)
    }

    fn rejection(
        reply: Result<Result<(), ConfigMutationError>, oneshot::error::RecvError>,
    ) -> Result<(), EditError> {
        match reply {
            Ok(result) => result.map_err(EditError::from),
            Err(_) => Err(EditError::Unavailable),
        }
    }
}
