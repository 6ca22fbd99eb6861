//! Configuration router - per-application button maps, focus state, and the
//! resolution algorithm
//!
//! The router owns the whole in-memory store. It is only ever touched from
//! the control loop, so reads and mutations need no locking, and `resolve`
//! can hand out borrows without surprises.

use super::button::{Action, ButtonConfig, ButtonUpdate};
use crate::core::error::ConfigMutationError;
use std::collections::{BTreeMap, BTreeSet};

/// Reserved application identity; always present, never removable
pub const DEFAULT_APP: &str = "default";

/// Ordered button map for one application identity
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ApplicationConfig {
    pub buttons: Vec<ButtonConfig>,
}

impl ApplicationConfig {
    /// A map of `button_count` empty placeholders with ids `1..=button_count`
    pub fn empty(button_count: u8) -> Self {
        Self {
            buttons: (1..=button_count).map(ButtonConfig::empty).collect(),
        }
    }

    pub fn button(&self, id: u8) -> Option<&ButtonConfig> {
        self.buttons.iter().find(|b| b.id == id)
    }

    fn button_mut(&mut self, id: u8) -> Option<&mut ButtonConfig> {
        self.buttons.iter_mut().find(|b| b.id == id)
    }
}

/// Disposable copy of the store handed to the presentation layer
pub type StoreSnapshot = BTreeMap<String, ApplicationConfig>;

/// The event-routing and per-application configuration core
#[derive(Debug)]
pub struct Router {
    store: BTreeMap<String, ApplicationConfig>,
    button_count: u8,
    /// Currently focused application identity
    active: String,
    /// Every application identity ever observed via focus changes
    observed: BTreeSet<String>,
}

impl Router {
    /// Create a router with only the `"default"` map populated with the
    /// starter button set
    pub fn new(button_count: u8) -> Self {
        let mut store = BTreeMap::new();
        store.insert(DEFAULT_APP.to_string(), starter_set(button_count));
        Self {
            store,
            button_count,
            active: DEFAULT_APP.to_string(),
            observed: BTreeSet::new(),
        }
    }

    /// The currently focused application identity
    pub fn active_application(&self) -> &str {
        &self.active
    }

    /// Every application identity observed so far
    pub fn observed_applications(&self) -> Vec<String> {
        self.observed.iter().cloned().collect()
    }

    /// Find the button a hardware code maps to under `application`, applying
    /// the fallback rule. Returns only usable (non-empty) buttons.
    ///
    /// Per-application maps start as all-empty placeholders; when the
    /// focused application's entry is missing or empty the `"default"` map
    /// is consulted so that adding an application never silently disables
    /// buttons the user has not filled in yet.
    pub fn resolve_button(&self, code: u8, application: &str) -> Option<&ButtonConfig> {
        let primary = self
            .store
            .get(application)
            .or_else(|| self.store.get(DEFAULT_APP))?;

        match primary.button(code) {
            Some(button) if !button.action.is_empty() => Some(button),
            _ if application != DEFAULT_APP => self
                .store
                .get(DEFAULT_APP)
                .and_then(|default| default.button(code))
                .filter(|button| !button.action.is_empty()),
            _ => None,
        }
    }

    /// Resolve a hardware code against an application identity.
    ///
    /// Pure read: no effect on the store or focus state.
    pub fn resolve(&self, code: u8, application: &str) -> Action {
        self.resolve_button(code, application)
            .map(|button| button.to_action())
            .unwrap_or(Action::None)
    }

    /// Register a new application identity with an all-empty button map.
    ///
    /// Rejects identities that already have a map, which makes registering
    /// `"default"` always fail.
    pub fn register_application(&mut self, id: &str) -> Result<(), ConfigMutationError> {
        if self.store.contains_key(id) {
            return Err(ConfigMutationError::ApplicationExists(id.to_string()));
        }
        self.store
            .insert(id.to_string(), ApplicationConfig::empty(self.button_count));
        Ok(())
    }

    /// Merge a partial update into one button of one application's map
    pub fn update_button(
        &mut self,
        application: &str,
        button: u8,
        update: ButtonUpdate,
    ) -> Result<(), ConfigMutationError> {
        let config = self
            .store
            .get_mut(application)
            .ok_or_else(|| ConfigMutationError::UnknownApplication(application.to_string()))?;
        let entry = config
            .button_mut(button)
            .ok_or_else(|| ConfigMutationError::UnknownButton {
                application: application.to_string(),
                button,
            })?;
        entry.apply(update);
        Ok(())
    }

    /// Record the focused application. Always succeeds; returns whether the
    /// identity actually changed so callers can suppress redundant
    /// downstream notifications.
    pub fn set_active_application(&mut self, id: &str) -> bool {
        self.observed.insert(id.to_string());
        if self.active == id {
            return false;
        }
        self.active = id.to_string();
        true
    }

    /// Disposable copy of the whole store for the presentation layer
    pub fn snapshot(&self) -> StoreSnapshot {
        self.store.clone()
    }
}

/// The default map seeded at process start: all placeholders, with a few
/// common shortcuts pre-assigned
fn starter_set(button_count: u8) -> ApplicationConfig {
    let mut config = ApplicationConfig::empty(button_count);
    let seeds = [
        (1u8, "Copy", "copy selection", "Cmd+C"),
        (2, "Paste", "paste clipboard", "Cmd+V"),
        (4, "Cut", "cut selection", "Cmd+X"),
    ];
    for (id, name, description, shortcut) in seeds {
        if let Some(button) = config.button_mut(id) {
            *button = ButtonConfig::shortcut(id, name, description, shortcut);
        }
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::button::ButtonAction;
    use crate::shortcut::KeyToken;
    use serde_json::json;

    fn remote_update(command: &str, args: serde_json::Map<String, serde_json::Value>) -> ButtonUpdate {
        ButtonUpdate {
            action: Some(ButtonAction::Remote {
                command: command.to_string(),
                args,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_starter_set_seeds_default() {
        let router = Router::new(12);
        assert_eq!(
            router.resolve(1, DEFAULT_APP),
            Action::KeyPress(vec![KeyToken::Cmd, KeyToken::Letter('C')])
        );
        assert_eq!(
            router.resolve(4, DEFAULT_APP),
            Action::KeyPress(vec![KeyToken::Cmd, KeyToken::Letter('X')])
        );
        // Unseeded ids are empty placeholders
        assert_eq!(router.resolve(3, DEFAULT_APP), Action::None);
    }

    #[test]
    fn test_resolve_unmapped_code_is_none() {
        let router = Router::new(12);
        assert_eq!(router.resolve(99, DEFAULT_APP), Action::None);
    }

    #[test]
    fn test_fallback_on_empty_entry() {
        let mut router = Router::new(12);
        router.register_application("Editor").unwrap();
        // Editor's id 1 is an empty placeholder, so default's Cmd+C applies
        assert_eq!(
            router.resolve(1, "Editor"),
            router.resolve(1, DEFAULT_APP)
        );
    }

    #[test]
    fn test_fallback_on_unknown_application() {
        let router = Router::new(12);
        assert_eq!(
            router.resolve(1, "Unknown"),
            router.resolve(1, DEFAULT_APP)
        );
        assert_eq!(router.resolve(3, "Unknown"), Action::None);
    }

    #[test]
    fn test_app_specific_entry_wins_over_default() {
        let mut router = Router::new(12);
        router.register_application("Editor").unwrap();
        router
            .update_button("Editor", 1, remote_update("save", serde_json::Map::new()))
            .unwrap();
        match router.resolve(1, "Editor") {
            Action::Remote { command, .. } => assert_eq!(command, "save"),
            other => panic!("expected remote action, got {:?}", other),
        }
    }

    #[test]
    fn test_incomplete_shortcut_does_not_fall_back() {
        // A non-empty Shortcut entry with an uncompilable string resolves to
        // an empty key press rather than falling back to default
        let mut router = Router::new(12);
        router.register_application("Editor").unwrap();
        router
            .update_button(
                "Editor",
                1,
                ButtonUpdate {
                    action: Some(ButtonAction::Shortcut {
                        shortcut: String::new(),
                    }),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(router.resolve(1, "Editor"), Action::KeyPress(vec![]));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut router = Router::new(12);
        router.register_application("Editor").unwrap();
        let before = router.snapshot();
        let first = router.resolve(1, "Editor");
        let second = router.resolve(1, "Editor");
        assert_eq!(first, second);
        assert_eq!(router.snapshot(), before);
    }

    #[test]
    fn test_register_default_always_fails() {
        let mut router = Router::new(12);
        assert_eq!(
            router.register_application(DEFAULT_APP),
            Err(ConfigMutationError::ApplicationExists(
                DEFAULT_APP.to_string()
            ))
        );
    }

    #[test]
    fn test_register_duplicate_fails() {
        let mut router = Router::new(12);
        router.register_application("Editor").unwrap();
        assert!(matches!(
            router.register_application("Editor"),
            Err(ConfigMutationError::ApplicationExists(_))
        ));
    }

    #[test]
    fn test_register_populates_full_button_range() {
        let mut router = Router::new(6);
        router.register_application("Editor").unwrap();
        let snapshot = router.snapshot();
        let editor = &snapshot["Editor"];
        let ids: Vec<u8> = editor.buttons.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
        assert!(editor.buttons.iter().all(|b| b.action.is_empty()));
    }

    #[test]
    fn test_update_button_unknown_targets() {
        let mut router = Router::new(12);
        assert!(matches!(
            router.update_button("Ghost", 1, ButtonUpdate::default()),
            Err(ConfigMutationError::UnknownApplication(_))
        ));
        assert!(matches!(
            router.update_button(DEFAULT_APP, 200, ButtonUpdate::default()),
            Err(ConfigMutationError::UnknownButton { .. })
        ));
    }

    #[test]
    fn test_update_button_merges_fields() {
        let mut router = Router::new(12);
        let mut args = serde_json::Map::new();
        args.insert("path".to_string(), json!("/x"));
        router
            .update_button(DEFAULT_APP, 1, remote_update("importFootage", args))
            .unwrap();

        match router.resolve(1, DEFAULT_APP) {
            Action::Remote { command, args } => {
                assert_eq!(command, "importFootage");
                assert_eq!(args["path"], json!("/x"));
            }
            other => panic!("expected remote action, got {:?}", other),
        }
        // Name untouched by the partial update
        let snapshot = router.snapshot();
        assert_eq!(snapshot[DEFAULT_APP].button(1).unwrap().name, "Copy");
    }

    #[test]
    fn test_set_active_deduplicates() {
        let mut router = Router::new(12);
        assert!(router.set_active_application("Editor"));
        assert!(!router.set_active_application("Editor"));
        assert!(router.set_active_application("Browser"));
        assert_eq!(router.active_application(), "Browser");
        assert_eq!(
            router.observed_applications(),
            vec!["Browser".to_string(), "Editor".to_string()]
        );
    }
}
