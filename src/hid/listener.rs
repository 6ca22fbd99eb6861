//! HID device discovery, the button read loop, and reconnection

use crate::core::config::HidConfig;
use crate::core::events::{AppEvent, EventSender};
use anyhow::{anyhow, Context, Result};
use hidapi::{HidApi, HidDevice};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Reconnect backoff ceiling
const RECONNECT_MAX_MS: u64 = 5000;

/// Read buffer size; only the first byte carries the button code, any
/// further bytes belong to the device firmware and are ignored here
const REPORT_SIZE: usize = 64;

/// Listens for button presses on the macropad and reports connection state.
///
/// The device being absent is not an error: the listener keeps polling in
/// the background while the rest of the system runs in editing-only mode.
pub struct HidListener {
    api: Arc<Mutex<HidApi>>,
    device: Arc<Mutex<Option<HidDevice>>>,
    config: HidConfig,
    event_tx: EventSender,
    connected: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
}

impl HidListener {
    /// Initialize the HID API, attempt an initial connection, and start the
    /// read and reconnect threads
    pub fn new(config: HidConfig, event_tx: EventSender) -> Result<Self> {
        let api = HidApi::new().context("Failed to initialize HID API")?;

        let listener = Self {
            api: Arc::new(Mutex::new(api)),
            device: Arc::new(Mutex::new(None)),
            config,
            event_tx,
            connected: Arc::new(AtomicBool::new(false)),
            stop: Arc::new(AtomicBool::new(false)),
        };

        if let Err(e) = listener.try_connect() {
            info!("Device not available yet (editing-only until it appears): {}", e);
        }

        listener.start_read_thread();
        listener.start_reconnect_monitor();

        Ok(listener)
    }

    /// Try to open the configured device right now
    pub fn try_connect(&self) -> Result<()> {
        let api = self.api.lock();
        let device_info = api
            .device_list()
            .find(|d| {
                d.vendor_id() == self.config.vendor_id && d.product_id() == self.config.product_id
            })
            .ok_or_else(|| {
                anyhow!(
                    "Macropad not found (VID: 0x{:04X}, PID: 0x{:04X})",
                    self.config.vendor_id,
                    self.config.product_id
                )
            })?;

        info!(
            "Found macropad: {} {}",
            device_info.manufacturer_string().unwrap_or("Unknown"),
            device_info.product_string().unwrap_or("Unknown")
        );

        let device = device_info
            .open_device(&api)
            .context("Failed to open HID device")?;
        device
            .set_blocking_mode(false)
            .context("Failed to set non-blocking mode")?;

        *self.device.lock() = Some(device);
        self.connected.store(true, Ordering::Relaxed);
        let _ = self.event_tx.send(AppEvent::DeviceConnected);

        Ok(())
    }

    /// Check if the device is connected
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// Read loop: first byte of each report is the button code
    fn start_read_thread(&self) {
        let device = Arc::clone(&self.device);
        let connected = Arc::clone(&self.connected);
        let stop = Arc::clone(&self.stop);
        let event_tx = self.event_tx.clone();
        let timeout_ms = self.config.read_timeout_ms;

        thread::spawn(move || {
            info!("HID read thread started");
            let mut buffer = [0u8; REPORT_SIZE];

            while !stop.load(Ordering::Relaxed) {
                if !connected.load(Ordering::Relaxed) {
                    thread::sleep(Duration::from_millis(200));
                    continue;
                }

                let read = {
                    let guard = device.lock();
                    match guard.as_ref() {
                        Some(dev) => dev.read_timeout(&mut buffer, timeout_ms),
                        None => {
                            drop(guard);
                            thread::sleep(Duration::from_millis(200));
                            continue;
                        }
                    }
                };

                match read {
                    Ok(n) if n > 0 => {
                        let code = buffer[0];
                        debug!("HID report received, button code {}", code);
                        let _ = event_tx.send(AppEvent::ButtonPressed { code });
                    }
                    Ok(_) => {} // Timeout, nothing pressed
                    Err(e) => {
                        warn!("HID read error, treating device as disconnected: {}", e);
                        *device.lock() = None;
                        connected.store(false, Ordering::Relaxed);
                        let _ = event_tx.send(AppEvent::DeviceDisconnected);
                    }
                }
            }
            info!("HID read thread stopped");
        });
    }

    /// Polling monitor that reopens the device with backoff after loss
    fn start_reconnect_monitor(&self) {
        let api = Arc::clone(&self.api);
        let device = Arc::clone(&self.device);
        let connected = Arc::clone(&self.connected);
        let stop = Arc::clone(&self.stop);
        let event_tx = self.event_tx.clone();
        let config = self.config.clone();

        thread::spawn(move || {
            info!("HID reconnect monitor started");
            let initial_ms = config.reconnect_interval_ms;
            let mut interval_ms = initial_ms;

            while !stop.load(Ordering::Relaxed) {
                if !connected.load(Ordering::Relaxed) {
                    {
                        let mut api_guard = api.lock();
                        if let Err(e) = api_guard.refresh_devices() {
                            debug!("Failed to refresh device list: {}", e);
                        }
                    }

                    if let Some(dev) = try_open_device(&api, &config) {
                        *device.lock() = Some(dev);
                        connected.store(true, Ordering::Relaxed);
                        let _ = event_tx.send(AppEvent::DeviceConnected);
                        interval_ms = initial_ms;
                    } else {
                        interval_ms = (interval_ms * 3 / 2).min(RECONNECT_MAX_MS);
                        debug!("Device not found, next attempt in {}ms", interval_ms);
                    }

                    thread::sleep(Duration::from_millis(interval_ms));
                } else {
                    thread::sleep(Duration::from_millis(1000));
                }
            }
            info!("HID reconnect monitor stopped");
        });
    }

    /// Drop the device handle if held
    pub fn disconnect(&self) {
        let mut guard = self.device.lock();
        if guard.take().is_some() {
            self.connected.store(false, Ordering::Relaxed);
            let _ = self.event_tx.send(AppEvent::DeviceDisconnected);
            info!("Disconnected from macropad");
        }
    }
}

impl Drop for HidListener {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        self.disconnect();
    }
}

/// Try to open the configured device, logging but swallowing failures
fn try_open_device(api: &Arc<Mutex<HidApi>>, config: &HidConfig) -> Option<HidDevice> {
    let api_guard = api.lock();
    let device_info = api_guard
        .device_list()
        .find(|d| d.vendor_id() == config.vendor_id && d.product_id() == config.product_id)?;

    match device_info.open_device(&api_guard) {
        Ok(dev) => {
            if let Err(e) = dev.set_blocking_mode(false) {
                warn!("Failed to set non-blocking mode: {}", e);
                return None;
            }
            info!(
                "Opened device: {} {}",
                device_info.manufacturer_string().unwrap_or("Unknown"),
                device_info.product_string().unwrap_or("Unknown")
            );
            Some(dev)
        }
        Err(e) => {
            debug!("Failed to open device: {}", e);
            None
        }
    }
}
