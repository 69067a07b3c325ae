//! Author-time validation of command definitions
//!
//! Runs when a definition is saved or edited, never during invocation.
//! Structural problems are errors and should block the save; unbalanced
//! template markers are warnings (the template is stored anyway and
//! resolution stays lenient).

use crate::action::{Action, ActionKind, Button, ButtonStyle, SelectMenu};
use crate::command::{CommandDefinition, CommandEntry};
use crate::condition::Condition;
use crate::template::{self, TemplateSyntaxWarning};
use thiserror::Error;

/// A structural problem in a stored definition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("command name is empty")]
    EmptyName,
    #[error("definition has neither a description nor actions")]
    EmptyDefinition,
    #[error("cooldown must not be negative (got {0})")]
    NegativeCooldown(i64),
    #[error("chance must be between 0 and 100 (got {0})")]
    ChanceOutOfRange(i64),
    #[error("select menu has an empty custom id")]
    SelectMenuMissingId,
    #[error("select menu {0:?} has no options")]
    SelectMenuEmptyOptions(String),
    #[error("select menu {0:?} allows at least {1} selections but at most {2}")]
    SelectMenuBounds(String, u8, u8),
    #[error("link button {0:?} has no url")]
    LinkButtonMissingUrl(String),
    #[error("link button {0:?} cannot carry actions")]
    LinkButtonWithActions(String),
    #[error("button {0:?} has a url but is not link-style")]
    UrlOnDispatchButton(String),
    #[error("random_reply action has no messages")]
    RandomReplyWithoutMessages,
    #[error("send_channel action is missing channelId")]
    MissingChannelId,
    #[error("{0} action is missing roleId")]
    MissingRoleId(&'static str),
    #[error("timeout_user action needs a positive duration")]
    InvalidTimeoutDuration,
    #[error("unknown action type")]
    UnknownActionType,
    #[error("unknown condition type")]
    UnknownConditionType,
}

/// Everything `validate` found: blocking errors and template warnings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<TemplateSyntaxWarning>,
}

impl ValidationReport {
    /// Whether the definition may be saved
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Convert into a result, dropping warnings
    pub fn into_result(self) -> Result<(), Vec<ValidationError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    fn check_template(&mut self, text: &str) {
        if let Err(warning) = template::check(text) {
            self.warnings.push(warning);
        }
    }
}

/// Validate a stored command
pub fn validate(name: &str, entry: &CommandEntry) -> ValidationReport {
    let mut report = ValidationReport::default();
    if name.trim().is_empty() {
        report.errors.push(ValidationError::EmptyName);
    }
    match entry {
        CommandEntry::Literal(_) => {}
        CommandEntry::Structured(def) => validate_definition(def, &mut report),
    }
    report
}

fn validate_definition(def: &CommandDefinition, report: &mut ValidationReport) {
    if def.description.trim().is_empty() && def.actions.is_empty() {
        report.errors.push(ValidationError::EmptyDefinition);
    }
    if let Some(cooldown) = def.cooldown {
        if cooldown < 0 {
            report.errors.push(ValidationError::NegativeCooldown(cooldown));
        }
    }
    report.check_template(&def.description);
    for action in &def.actions {
        validate_action(action, report);
    }
}

fn validate_action(action: &Action, report: &mut ValidationReport) {
    for condition in &action.conditions {
        validate_condition(condition, report);
    }
    if let Some(content) = &action.content {
        report.check_template(content);
    }
    for message in &action.messages {
        report.check_template(message);
    }
    if let Some(embed) = &action.embed {
        for text in [&embed.title, &embed.description, &embed.footer]
            .into_iter()
            .flatten()
        {
            report.check_template(text);
        }
    }

    match action.kind {
        ActionKind::RandomReply if action.messages.is_empty() => {
            report.errors.push(ValidationError::RandomReplyWithoutMessages);
        }
        ActionKind::SendChannel if action.channel_id.is_none() => {
            report.errors.push(ValidationError::MissingChannelId);
        }
        ActionKind::AddRole if action.role_id.is_none() => {
            report.errors.push(ValidationError::MissingRoleId("add_role"));
        }
        ActionKind::RemoveRole if action.role_id.is_none() => {
            report.errors.push(ValidationError::MissingRoleId("remove_role"));
        }
        ActionKind::TimeoutUser if action.duration.unwrap_or(0) <= 0 => {
            report.errors.push(ValidationError::InvalidTimeoutDuration);
        }
        ActionKind::Unknown => {
            report.errors.push(ValidationError::UnknownActionType);
        }
        _ => {}
    }

    for button in &action.buttons {
        validate_button(button, report);
    }
    if let Some(menu) = &action.select_menu {
        validate_select_menu(menu, report);
    }
}

fn validate_condition(condition: &Condition, report: &mut ValidationReport) {
    match condition {
        Condition::Chance { chance } if !(0..=100).contains(chance) => {
            report.errors.push(ValidationError::ChanceOutOfRange(*chance));
        }
        Condition::Unknown => {
            report.errors.push(ValidationError::UnknownConditionType);
        }
        _ => {}
    }
}

fn validate_button(button: &Button, report: &mut ValidationReport) {
    if button.style == ButtonStyle::Link {
        // URL buttons are client-side navigation, never dispatched back
        if button.url.is_none() {
            report
                .errors
                .push(ValidationError::LinkButtonMissingUrl(button.label.clone()));
        }
        if !button.actions.is_empty() {
            report
                .errors
                .push(ValidationError::LinkButtonWithActions(button.label.clone()));
        }
    } else if button.url.is_some() {
        report
            .errors
            .push(ValidationError::UrlOnDispatchButton(button.label.clone()));
    }
    for action in &button.actions {
        validate_action(action, report);
    }
}

fn validate_select_menu(menu: &SelectMenu, report: &mut ValidationReport) {
    if menu.custom_id.trim().is_empty() {
        report.errors.push(ValidationError::SelectMenuMissingId);
    }
    if menu.options.is_empty() {
        report
            .errors
            .push(ValidationError::SelectMenuEmptyOptions(menu.custom_id.clone()));
    }
    if let (Some(min), Some(max)) = (menu.min_values, menu.max_values) {
        if min > max {
            report
                .errors
                .push(ValidationError::SelectMenuBounds(menu.custom_id.clone(), min, max));
        }
    }
    for option in &menu.options {
        for action in &option.actions {
            validate_action(action, report);
        }
    }
}
