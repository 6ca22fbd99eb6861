//! Panel WebSocket server - broadcast channel to the creative-tooling panel
//!
//! Listens on loopback and accepts any number of panel clients. Each client
//! gets an unbounded outgoing channel and a writer task; the client set
//! itself lives in the control loop's dispatcher, which learns about
//! connects and disconnects through `PanelConnected`/`PanelDisconnected`
//! events. Delivery is fire-and-forget: no acks, no retries, no queueing
//! for disconnected clients. Inbound messages are not consumed.

use crate::core::config::PanelConfig;
use crate::core::events::{AppEvent, EventSender};
use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{info, warn};

/// Run the accept loop. Client ids are unique for the process lifetime.
pub async fn run(config: PanelConfig, event_tx: EventSender) -> Result<()> {
    let listener = TcpListener::bind(("127.0.0.1", config.port))
        .await
        .with_context(|| format!("Failed to bind panel server on port {}", config.port))?;
    info!("Panel server listening on 127.0.0.1:{}", config.port);

    let mut next_id: u64 = 0;
    loop {
        let (stream, addr) = listener.accept().await.context("Panel accept failed")?;
        next_id += 1;
        let id = next_id;
        let event_tx = event_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(id, stream, event_tx).await {
                warn!("Panel client {} ({}) ended with error: {}", id, addr, e);
            }
        });
    }
}

async fn handle_client(id: u64, stream: TcpStream, event_tx: EventSender) -> Result<()> {
    let ws = tokio_tungstenite::accept_async(stream)
        .await
        .context("WebSocket handshake failed")?;
    let (mut ws_tx, mut ws_rx) = ws.split();

    let (client_tx, mut client_rx) = mpsc::unbounded_channel::<String>();
    let _ = event_tx.send(AppEvent::PanelConnected { id, tx: client_tx });
    info!("Panel client {} connected", id);

    // Writer task: forward broadcast payloads to the socket
    let writer = tokio::spawn(async move {
        while let Some(payload) = client_rx.recv().await {
            if ws_tx.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    // Read loop: the core consumes nothing from clients, just watch for close
    while let Some(msg) = ws_rx.next().await {
        match msg {
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!("Panel client {} read error: {}", id, e);
                break;
            }
        }
    }

    writer.abort();
    let _ = event_tx.send(AppEvent::PanelDisconnected { id });
    info!("Panel client {} disconnected", id);
    Ok(())
}
