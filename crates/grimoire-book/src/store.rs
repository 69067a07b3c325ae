//! JSON command book store
//!
//! The persisted book is one JSON object keyed by command name; each value
//! is a bare reply string or a structured definition object with absent
//! optional fields omitted. Loading keeps keys and key order exactly as
//! written so a load/save round-trip is byte-equivalent modulo formatting.
//!
//! Mutation goes through [`JsonStore::insert`] / [`JsonStore::update`],
//! which validate first: structurally invalid definitions never reach the
//! book, matching the rule that validation errors are an authoring-time
//! concern.

use crate::error::{Error, Result};
use grimoire_core::{validate, CommandBook, CommandEntry, CommandStore, ValidationReport};
use std::fs;
use std::path::{Path, PathBuf};

/// A command book with optional file backing
#[derive(Debug, Default)]
pub struct JsonStore {
    book: CommandBook,
    path: Option<PathBuf>,
}

impl JsonStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a file-backed store, creating an empty book if the file is absent
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let book = if path.exists() {
            let raw = fs::read_to_string(path)?;
            serde_json::from_str(&raw)?
        } else {
            tracing::info!(path = %path.display(), "command book not found, starting empty");
            CommandBook::new()
        };
        let store = Self {
            book,
            path: Some(path.to_path_buf()),
        };
        store.report_lints();
        Ok(store)
    }

    /// Parse an in-memory store from a JSON string
    pub fn from_json(raw: &str) -> Result<Self> {
        let book: CommandBook = serde_json::from_str(raw)?;
        let store = Self { book, path: None };
        store.report_lints();
        Ok(store)
    }

    /// Serialize the book back to its JSON representation
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.book)?)
    }

    /// Write the book to its backing file
    pub fn save(&self) -> Result<()> {
        let path = self.path.as_ref().ok_or(Error::NoBackingFile)?;
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// The in-memory book
    pub fn book(&self) -> &CommandBook {
        &self.book
    }

    /// Add a new command; rejects duplicates and invalid definitions
    pub fn insert(&mut self, name: &str, entry: CommandEntry) -> Result<()> {
        if self.book.contains(name) {
            return Err(Error::DuplicateCommand(name.to_string()));
        }
        self.check(name, &entry)?;
        self.book.insert(name, entry);
        Ok(())
    }

    /// Replace an existing command; rejects unknown names and invalid definitions
    pub fn update(&mut self, name: &str, entry: CommandEntry) -> Result<()> {
        if !self.book.contains(name) {
            return Err(Error::UnknownCommand(name.to_string()));
        }
        self.check(name, &entry)?;
        self.book.insert(name, entry);
        Ok(())
    }

    /// Remove a command, returning its entry
    pub fn remove(&mut self, name: &str) -> Result<CommandEntry> {
        self.book
            .remove(name)
            .ok_or_else(|| Error::UnknownCommand(name.to_string()))
    }

    /// Validation reports for every stored command that has findings
    ///
    /// Legacy books may contain entries that predate a validation rule;
    /// they stay loaded (and still run, degrading per action), but the
    /// authoring surface can show these reports.
    pub fn lint(&self) -> Vec<(String, ValidationReport)> {
        self.book
            .iter()
            .map(|(name, entry)| (name.to_string(), validate(name, entry)))
            .filter(|(_, report)| !report.is_ok() || !report.warnings.is_empty())
            .collect()
    }

    fn check(&self, name: &str, entry: &CommandEntry) -> Result<()> {
        let report = validate(name, entry);
        for warning in &report.warnings {
            tracing::warn!(command = name, %warning, "template warning");
        }
        report.into_result().map_err(|errors| Error::Invalid {
            name: name.to_string(),
            errors,
        })
    }

    fn report_lints(&self) {
        for (name, report) in self.lint() {
            for error in &report.errors {
                tracing::warn!(command = %name, %error, "stored command fails validation");
            }
            for warning in &report.warnings {
                tracing::warn!(command = %name, %warning, "stored command template warning");
            }
        }
    }
}

impl CommandStore for JsonStore {
    fn command(&self, name: &str) -> Option<CommandEntry> {
        self.book.get(name).cloned()
    }

    fn commands(&self) -> Vec<(String, CommandEntry)> {
        self.book
            .iter()
            .map(|(name, entry)| (name.to_string(), entry.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grimoire_core::{Action, CommandDefinition, ValidationError};

    const BOOK: &str = r#"{
        "lore": "An old tale.",
        "greet": {
            "description": "Hello {{ user.displayName }}",
            "cooldown": 5
        },
        "roll": {
            "description": "You rolled {{ random(1, 6) }}",
            "actions": [
                {
                    "type": "send_message",
                    "content": "again?",
                    "buttons": [
                        {"label": "Reroll", "style": "Primary", "customId": "reroll"}
                    ]
                }
            ]
        }
    }"#;

    #[test]
    fn test_round_trip_is_lossless() {
        let store = JsonStore::from_json(BOOK).unwrap();
        let reserialized = store.to_json().unwrap();
        let original: serde_json::Value = serde_json::from_str(BOOK).unwrap();
        let round_tripped: serde_json::Value = serde_json::from_str(&reserialized).unwrap();
        assert_eq!(original, round_tripped);
    }

    #[test]
    fn test_key_order_preserved() {
        let store = JsonStore::from_json(BOOK).unwrap();
        let names: Vec<_> = store.commands().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["lore", "greet", "roll"]);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let store = JsonStore::from_json(BOOK).unwrap();
        assert!(store.command("GREET").is_some());
        assert!(store.command("missing").is_none());
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut store = JsonStore::from_json(BOOK).unwrap();
        let err = store.insert("Lore", CommandEntry::from("rewrite")).unwrap_err();
        assert!(matches!(err, Error::DuplicateCommand(_)));
    }

    #[test]
    fn test_insert_rejects_invalid_definitions() {
        let mut store = JsonStore::new();
        let empty = CommandEntry::Structured(CommandDefinition::new());
        let err = store.insert("broken", empty).unwrap_err();
        match err {
            Error::Invalid { name, errors } => {
                assert_eq!(name, "broken");
                assert!(errors.contains(&ValidationError::EmptyDefinition));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn test_update_requires_existing_command() {
        let mut store = JsonStore::new();
        let err = store
            .update("ghost", CommandEntry::from("boo"))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownCommand(_)));

        store.insert("ghost", CommandEntry::from("boo")).unwrap();
        store.update("ghost", CommandEntry::from("BOO")).unwrap();
        assert_eq!(store.command("ghost"), Some(CommandEntry::from("BOO")));
    }

    #[test]
    fn test_remove() {
        let mut store = JsonStore::from_json(BOOK).unwrap();
        assert!(store.remove("lore").is_ok());
        assert!(store.command("lore").is_none());
        assert!(matches!(store.remove("lore"), Err(Error::UnknownCommand(_))));
    }

    #[test]
    fn test_lint_reports_legacy_problems() {
        // a legacy book with an action type this build does not know
        let raw = r#"{"odd": {"actions": [{"type": "summon_dragon"}]}}"#;
        let store = JsonStore::from_json(raw).unwrap();
        let lints = store.lint();
        assert_eq!(lints.len(), 1);
        assert_eq!(lints[0].0, "odd");
        assert!(!lints[0].1.is_ok());
    }

    #[test]
    fn test_save_without_backing_file() {
        let mut store = JsonStore::new();
        store
            .insert(
                "cast",
                CommandEntry::Structured(
                    CommandDefinition::new().with_action(Action::send_message("zap")),
                ),
            )
            .unwrap();
        assert!(matches!(store.save(), Err(Error::NoBackingFile)));
    }

    #[test]
    fn test_open_and_save_round_trip() {
        let dir = std::env::temp_dir().join("grimoire-store-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("commands.json");
        fs::write(&path, BOOK).unwrap();

        let store = JsonStore::open(&path).unwrap();
        store.save().unwrap();
        let reloaded = JsonStore::open(&path).unwrap();
        assert_eq!(store.book(), reloaded.book());

        fs::remove_file(&path).unwrap();
        let empty = JsonStore::open(&path).unwrap();
        assert!(empty.book().is_empty());
    }
}
