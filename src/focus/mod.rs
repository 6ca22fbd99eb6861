//! Focus tracker adapter - foreground application polling and window
//! enumeration
//!
//! Polls the OS for the active window on a dedicated thread and emits a
//! `FocusChanged` event whenever the application identity differs from the
//! last one seen; identical consecutive observations never re-notify.
//! A failed query is treated as "no change". On platforms that gate window
//! titles behind a permission grant, the title may come back blank while
//! the process name still identifies the application.

use crate::core::config::FocusConfig;
use crate::core::events::{AppEvent, EventSender};
use anyhow::{anyhow, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Background poller for the foreground application identity
pub struct FocusTracker {
    stop: Arc<AtomicBool>,
}

impl FocusTracker {
    /// Start the polling thread
    pub fn spawn(config: FocusConfig, event_tx: EventSender) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        thread::spawn(move || {
            info!("Focus tracker started");
            let mut last_identity: Option<String> = None;

            while !stop_flag.load(Ordering::Relaxed) {
                match x_win::get_active_window() {
                    Ok(window) => {
                        let application = application_identity(&window);
                        if !application.is_empty() && last_identity.as_deref() != Some(&application)
                        {
                            debug!("Focus changed to {:?}", application);
                            last_identity = Some(application.clone());
                            let _ = event_tx.send(AppEvent::FocusChanged {
                                application,
                                title: window.title.clone(),
                            });
                        }
                    }
                    // Absence signal: keep the last known identity
                    Err(e) => debug!("Active window query failed: {:?}", e),
                }
                thread::sleep(Duration::from_millis(config.poll_interval_ms));
            }
            info!("Focus tracker stopped");
        });

        Self { stop }
    }
}

impl Drop for FocusTracker {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

/// Owner names of all currently open windows, deduplicated.
///
/// Used only to populate "add application" candidates, never for routing;
/// the caller falls back to the observed identity set when this fails.
pub fn list_window_owners() -> Result<Vec<String>> {
    let windows =
        x_win::get_open_windows().map_err(|e| anyhow!("window enumeration failed: {:?}", e))?;

    let mut owners = Vec::new();
    for window in &windows {
        let identity = application_identity(window);
        if !identity.is_empty() && !owners.contains(&identity) {
            owners.push(identity);
        }
    }
    Ok(owners)
}

/// Application identity for a window: the owning process's display name,
/// falling back to its executable name
fn application_identity(window: &x_win::WindowInfo) -> String {
    if window.info.name.is_empty() {
        window.info.exec_name.clone()
    } else {
        window.info.name.clone()
    }
}
