//! Command definitions and the definitions table
//!
//! The persisted command book is a JSON object keyed by command name; each
//! value is either a bare reply string or a structured definition. Names
//! are matched case-insensitively (new entries are stored lowercased), but
//! keys loaded from an existing book are kept as written so a load/save
//! round-trip is lossless.

use crate::action::Action;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A structured command definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandDefinition {
    /// Reply description template; may be empty when `actions` is not
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Main embed image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gif: Option<String>,
    /// Per-user cooldown in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_icon: Option<String>,
    /// Root action list, run in declared order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
    /// When set, invoking asks for confirmation before running the actions
    #[serde(
        rename = "requireConfirmation",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub require_confirmation: Option<bool>,
    #[serde(
        rename = "confirmationMessage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub confirmation_message: Option<String>,
}

impl CommandDefinition {
    /// Create an empty definition
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the description template
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append a root action
    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Set the cooldown in seconds
    pub fn with_cooldown(mut self, seconds: i64) -> Self {
        self.cooldown = Some(seconds);
        self
    }

    /// Whether invoking must be confirmed first
    pub fn needs_confirmation(&self) -> bool {
        self.require_confirmation == Some(true)
    }
}

/// A stored command: a bare reply string or a structured definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandEntry {
    Literal(String),
    Structured(CommandDefinition),
}

impl CommandEntry {
    /// The structured definition, if this entry has one
    pub fn definition(&self) -> Option<&CommandDefinition> {
        match self {
            CommandEntry::Literal(_) => None,
            CommandEntry::Structured(def) => Some(def),
        }
    }
}

impl From<&str> for CommandEntry {
    fn from(s: &str) -> Self {
        CommandEntry::Literal(s.to_string())
    }
}

impl From<CommandDefinition> for CommandEntry {
    fn from(def: CommandDefinition) -> Self {
        CommandEntry::Structured(def)
    }
}

/// The ordered name → definition table
///
/// Preserves insertion order so the book serializes back in the order it
/// was loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandBook {
    entries: IndexMap<String, CommandEntry>,
}

impl CommandBook {
    /// Create an empty book
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a command, case-insensitively
    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        if let Some(entry) = self.entries.get(name) {
            return Some(entry);
        }
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, entry)| entry)
    }

    /// Whether a command with this name exists, case-insensitively
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert a command under its lowercased name
    ///
    /// Replaces any existing entry with the same normalized name.
    pub fn insert(&mut self, name: &str, entry: CommandEntry) {
        let normalized = name.to_lowercase();
        if let Some(existing) = self
            .entries
            .keys()
            .find(|key| key.eq_ignore_ascii_case(&normalized))
            .cloned()
        {
            self.entries.insert(existing, entry);
        } else {
            self.entries.insert(normalized, entry);
        }
    }

    /// Remove a command, case-insensitively
    pub fn remove(&mut self, name: &str) -> Option<CommandEntry> {
        let key = self
            .entries
            .keys()
            .find(|key| key.eq_ignore_ascii_case(name))
            .cloned()?;
        self.entries.shift_remove(&key)
    }

    /// Iterate entries in stored order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CommandEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of stored commands
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the book is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read access to the definitions table, as seen by the engine
///
/// Implemented by the persistent-store collaborator; the engine itself
/// never mutates definitions.
pub trait CommandStore: Send + Sync {
    /// Fetch one command by (case-insensitive) name
    fn command(&self, name: &str) -> Option<CommandEntry>;

    /// Snapshot of all commands in stored order
    fn commands(&self) -> Vec<(String, CommandEntry)>;
}

impl CommandStore for CommandBook {
    fn command(&self, name: &str) -> Option<CommandEntry> {
        self.get(name).cloned()
    }

    fn commands(&self) -> Vec<(String, CommandEntry)> {
        self.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }
}
