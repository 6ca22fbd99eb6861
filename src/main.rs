//! Keydeck - Entry Point
//!
//! Wires the event sources (HID listener, focus tracker, panel server) to
//! the single routing loop and runs until interrupted.

use anyhow::Result;
use clap::Parser;
use keydeck::{
    app::App,
    core::{config::Config, events::AppEvent},
    focus::FocusTracker,
    hid::HidListener,
    inject, panel,
};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "keydeck", about = "HID macropad to shortcut/panel bridge")]
struct Args {
    /// Path to the configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the panel server port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(port) = args.port {
        config.panel.port = port;
    }
    info!("Starting keydeck");

    let (event_tx, event_rx) = mpsc::unbounded_channel::<AppEvent>();

    // Device absent is fine (editing-only mode); a missing HID backend is
    // logged and the rest of the system still runs
    let _hid = match HidListener::new(config.hid.clone(), event_tx.clone()) {
        Ok(listener) => Some(listener),
        Err(e) => {
            error!("Failed to initialize HID listener: {}", e);
            None
        }
    };

    let _focus = FocusTracker::spawn(config.focus.clone(), event_tx.clone());

    let panel_config = config.panel.clone();
    let panel_tx = event_tx.clone();
    tokio::spawn(async move {
        if let Err(e) = panel::run(panel_config, panel_tx).await {
            error!("Panel server failed: {}", e);
        }
    });

    let keys = inject::spawn_injector();
    let app = App::new(&config, Box::new(keys));

    tokio::select! {
        _ = app.run(event_rx) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupt received, shutting down");
        }
    }

    Ok(())
}
