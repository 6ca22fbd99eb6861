//! Button configuration types and the dispatch-ready `Action`

use crate::shortcut::{self, KeyToken};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What a button does when pressed.
///
/// A tagged union rather than optional fields, so a button can never carry
/// a shortcut string and a remote command at the same time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ButtonAction {
    /// Placeholder; never produces a dispatched action
    Empty,
    /// A keyboard shortcut in raw string form, e.g. `"Cmd+Shift+Z"`
    Shortcut { shortcut: String },
    /// A named command forwarded to the panel channel
    Remote {
        command: String,
        #[serde(default)]
        args: Map<String, Value>,
    },
}

impl ButtonAction {
    /// True for the `Empty` placeholder
    pub fn is_empty(&self) -> bool {
        matches!(self, ButtonAction::Empty)
    }
}

/// One physical button's behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonConfig {
    /// Stable hardware code, unique within a button map
    pub id: u8,
    /// Display name
    pub name: String,
    /// Display description
    pub description: String,
    #[serde(flatten)]
    pub action: ButtonAction,
}

impl ButtonConfig {
    /// A fresh placeholder button
    pub fn empty(id: u8) -> Self {
        Self {
            id,
            name: format!("Button {}", id),
            description: String::new(),
            action: ButtonAction::Empty,
        }
    }

    pub fn shortcut(id: u8, name: &str, description: &str, shortcut: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: description.to_string(),
            action: ButtonAction::Shortcut {
                shortcut: shortcut.to_string(),
            },
        }
    }

    /// Merge a partial update, preserving `id`
    pub fn apply(&mut self, update: ButtonUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(action) = update.action {
            self.action = action;
        }
    }

    /// Display-ready summary for status notifications
    pub fn label(&self) -> String {
        match &self.action {
            ButtonAction::Empty => format!("{}: unassigned", self.name),
            ButtonAction::Shortcut { shortcut } => {
                format!("{}: {} ({})", self.name, self.description, shortcut)
            }
            ButtonAction::Remote { command, .. } => {
                format!("{}: {} ({})", self.name, self.description, command)
            }
        }
    }

    /// Translate into a dispatch-ready action
    pub fn to_action(&self) -> Action {
        match &self.action {
            ButtonAction::Empty => Action::None,
            ButtonAction::Shortcut { shortcut: s } => Action::KeyPress(shortcut::compile(s)),
            ButtonAction::Remote { command, args } => Action::Remote {
                command: command.clone(),
                args: args.clone(),
            },
        }
    }
}

/// Partial update for [`ButtonConfig`]; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ButtonUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub action: Option<ButtonAction>,
}

/// The resolved, dispatch-ready result of routing a hardware code
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// No button mapped, or the button is an empty placeholder
    None,
    /// Ordered key tokens delivered as one combined press
    KeyPress(Vec<KeyToken>),
    /// Command broadcast to the panel channel as `{"cmd": .., "args": ..}`
    Remote {
        command: String,
        args: Map<String, Value>,
    },
}
