//! Keystroke-injection channel
//!
//! A dedicated thread owns the `enigo` handle (it is not `Send` on every
//! platform) and drains a channel of token sequences, so the routing path
//! only ever performs a non-blocking send. Injection failures are logged
//! here and never reach the router.

use crate::dispatch::KeySink;
use crate::shortcut::KeyToken;
use anyhow::anyhow;
use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use std::thread;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Channel into the injection thread; implements [`KeySink`]
#[derive(Clone)]
pub struct InjectorHandle {
    tx: mpsc::UnboundedSender<Vec<KeyToken>>,
}

impl KeySink for InjectorHandle {
    fn press_combo(&self, tokens: &[KeyToken]) -> anyhow::Result<()> {
        self.tx
            .send(tokens.to_vec())
            .map_err(|_| anyhow!("keystroke injection thread is gone"))
    }
}

/// Spawn the injection thread and return its handle
pub fn spawn_injector() -> InjectorHandle {
    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<KeyToken>>();

    thread::spawn(move || {
        let mut enigo = match Enigo::new(&Settings::default()) {
            Ok(enigo) => enigo,
            Err(e) => {
                error!("Failed to initialize keystroke injector: {}", e);
                // Keep draining so senders never see the channel as full
                while rx.blocking_recv().is_some() {}
                return;
            }
        };
        info!("Keystroke injection thread started");

        while let Some(tokens) = rx.blocking_recv() {
            if let Err(e) = press_combo(&mut enigo, &tokens) {
                warn!("Keystroke injection failed: {}", e);
            }
        }
        info!("Keystroke injection thread stopped");
    });

    InjectorHandle { tx }
}

/// Hold every key down in order, then release in reverse, so the OS sees a
/// single combined press rather than a sequence of independent strokes
fn press_combo(enigo: &mut Enigo, tokens: &[KeyToken]) -> anyhow::Result<()> {
    for token in tokens {
        enigo.key(map_token(token), Direction::Press)?;
    }
    for token in tokens.iter().rev() {
        enigo.key(map_token(token), Direction::Release)?;
    }
    Ok(())
}

fn map_token(token: &KeyToken) -> Key {
    match token {
        KeyToken::Cmd => Key::Meta,
        KeyToken::Ctrl => Key::Control,
        KeyToken::Shift => Key::Shift,
        KeyToken::Alt => Key::Alt,
        KeyToken::Space => Key::Space,
        KeyToken::Letter(ch) => Key::Unicode(ch.to_ascii_lowercase()),
        KeyToken::Function(n) => function_key(*n),
    }
}

fn function_key(n: u8) -> Key {
    match n {
        1 => Key::F1,
        2 => Key::F2,
        3 => Key::F3,
        4 => Key::F4,
        5 => Key::F5,
        6 => Key::F6,
        7 => Key::F7,
        8 => Key::F8,
        9 => Key::F9,
        10 => Key::F10,
        11 => Key::F11,
        12 => Key::F12,
        13 => Key::F13,
        14 => Key::F14,
        15 => Key::F15,
        16 => Key::F16,
        17 => Key::F17,
        18 => Key::F18,
        19 => Key::F19,
        20 => Key::F20,
        21 => Key::F21,
        22 => Key::F22,
        23 => Key::F23,
        _ => Key::F24,
    }
}
