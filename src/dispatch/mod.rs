//! Action dispatcher - routes resolved actions to the two output channels
//!
//! Key presses go to the injection thread through [`KeySink`]; remote
//! commands are serialized once and broadcast to every registered panel
//! client. Both hand-offs are unbounded channel sends, so dispatching never
//! blocks the routing path.

use crate::core::error::DispatchError;
use crate::router::Action;
use crate::shortcut::KeyToken;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::debug;

/// Seam to the keystroke-injection channel.
///
/// The full ordered token slice is delivered in one call so that
/// modifier+letter combinations register as a single combined press.
pub trait KeySink: Send {
    fn press_combo(&self, tokens: &[KeyToken]) -> anyhow::Result<()>;
}

/// Outgoing panel payload: `{"cmd": name, "args": {..}}`
#[derive(Serialize)]
struct RemotePayload<'a> {
    cmd: &'a str,
    args: &'a Map<String, Value>,
}

/// Invokes the correct output channel for a resolved action
pub struct Dispatcher {
    keys: Box<dyn KeySink>,
    panel_clients: HashMap<u64, mpsc::UnboundedSender<String>>,
}

impl Dispatcher {
    pub fn new(keys: Box<dyn KeySink>) -> Self {
        Self {
            keys,
            panel_clients: HashMap::new(),
        }
    }

    /// Register a connected panel client's outgoing channel
    pub fn add_panel_client(&mut self, id: u64, tx: mpsc::UnboundedSender<String>) {
        self.panel_clients.insert(id, tx);
    }

    pub fn remove_panel_client(&mut self, id: u64) {
        self.panel_clients.remove(&id);
    }

    pub fn panel_client_count(&self) -> usize {
        self.panel_clients.len()
    }

    /// Dispatch a resolved action.
    ///
    /// `Action::None` and empty key sequences complete as no-ops. Remote
    /// delivery is fire-and-forget: clients whose channel has closed are
    /// skipped silently and dropped from the registry.
    pub fn dispatch(&mut self, action: &Action) -> Result<(), DispatchError> {
        match action {
            Action::None => Ok(()),
            Action::KeyPress(tokens) if tokens.is_empty() => Ok(()),
            Action::KeyPress(tokens) => self
                .keys
                .press_combo(tokens)
                .map_err(DispatchError::Keystroke),
            Action::Remote { command, args } => {
                let payload = serde_json::to_string(&RemotePayload { cmd: command, args })?;
                self.panel_clients.retain(|id, tx| {
                    if tx.send(payload.clone()).is_ok() {
                        true
                    } else {
                        debug!("panel client {} gone, skipping", id);
                        false
                    }
                });
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct RecordingSink {
        combos: Arc<Mutex<Vec<Vec<KeyToken>>>>,
    }

    impl KeySink for RecordingSink {
        fn press_combo(&self, tokens: &[KeyToken]) -> anyhow::Result<()> {
            self.combos.lock().push(tokens.to_vec());
            Ok(())
        }
    }

    fn remote_action(command: &str, args: Map<String, Value>) -> Action {
        Action::Remote {
            command: command.to_string(),
            args,
        }
    }

    #[test]
    fn test_none_is_a_no_op() {
        let sink = RecordingSink::default();
        let mut dispatcher = Dispatcher::new(Box::new(sink.clone()));
        dispatcher.dispatch(&Action::None).unwrap();
        assert!(sink.combos.lock().is_empty());
    }

    #[test]
    fn test_empty_key_press_is_a_no_op() {
        let sink = RecordingSink::default();
        let mut dispatcher = Dispatcher::new(Box::new(sink.clone()));
        dispatcher.dispatch(&Action::KeyPress(vec![])).unwrap();
        assert!(sink.combos.lock().is_empty());
    }

    #[test]
    fn test_key_press_delivers_ordered_combo() {
        let sink = RecordingSink::default();
        let mut dispatcher = Dispatcher::new(Box::new(sink.clone()));
        let tokens = vec![KeyToken::Cmd, KeyToken::Shift, KeyToken::Letter('Z')];
        dispatcher.dispatch(&Action::KeyPress(tokens.clone())).unwrap();
        assert_eq!(*sink.combos.lock(), vec![tokens]);
    }

    #[test]
    fn test_remote_broadcast_serialization() {
        let mut dispatcher = Dispatcher::new(Box::new(RecordingSink::default()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        dispatcher.add_panel_client(1, tx);

        let mut args = Map::new();
        args.insert("path".to_string(), json!("/x"));
        dispatcher
            .dispatch(&remote_action("importFootage", args))
            .unwrap();

        let payload = rx.try_recv().unwrap();
        assert_eq!(payload, r#"{"cmd":"importFootage","args":{"path":"/x"}}"#);
    }

    #[test]
    fn test_remote_broadcast_reaches_every_open_client() {
        let mut dispatcher = Dispatcher::new(Box::new(RecordingSink::default()));
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        dispatcher.add_panel_client(1, tx1);
        dispatcher.add_panel_client(2, tx2);

        dispatcher
            .dispatch(&remote_action("play", Map::new()))
            .unwrap();

        assert_eq!(rx1.try_recv().unwrap(), r#"{"cmd":"play","args":{}}"#);
        assert_eq!(rx2.try_recv().unwrap(), r#"{"cmd":"play","args":{}}"#);
    }

    #[test]
    fn test_closed_client_is_skipped_not_an_error() {
        let mut dispatcher = Dispatcher::new(Box::new(RecordingSink::default()));
        let (tx_closed, rx_closed) = mpsc::unbounded_channel();
        let (tx_open, mut rx_open) = mpsc::unbounded_channel();
        dispatcher.add_panel_client(1, tx_closed);
        dispatcher.add_panel_client(2, tx_open);
        drop(rx_closed);

        dispatcher
            .dispatch(&remote_action("stop", Map::new()))
            .unwrap();

        assert_eq!(rx_open.try_recv().unwrap(), r#"{"cmd":"stop","args":{}}"#);
        assert_eq!(dispatcher.panel_client_count(), 1);
    }
}
