//! Action and component data model
//!
//! An action is one declarative unit of bot behavior: a type tag, optional
//! gating conditions, and the payload fields its type needs. Actions can
//! render interactive components (buttons, a select menu) whose nested
//! action lists run when the component fires.
//!
//! Field names mirror the persisted JSON exactly; absent optional fields
//! are omitted on serialize, never emitted as null.

use crate::condition::Condition;
use crate::id::{ChannelId, RoleId, UserId};
use serde::{Deserialize, Serialize};

/// The closed set of action types
///
/// Serialized as the snake_case tag strings of the persisted format. A tag
/// this build does not know deserializes to [`ActionKind::Unknown`] so data
/// drift surfaces at evaluation time instead of failing the whole book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    /// Reply to the invocation
    SendMessage,
    /// Post into the channel named by `channelId`
    SendChannel,
    /// Direct-message `userId` (the invoker when absent)
    SendDm,
    /// Reply with one uniformly chosen entry of `messages`
    RandomReply,
    /// Grant `roleId` to the invoker
    AddRole,
    /// Revoke `roleId` from the invoker
    RemoveRole,
    /// Delete the triggering message
    DeleteMessage,
    /// Time out `userId` (the invoker when absent) for `duration` seconds
    TimeoutUser,
    /// Catch-all for action types this build does not know
    Unknown,
}

impl ActionKind {
    /// The persisted tag string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SendMessage => "send_message",
            Self::SendChannel => "send_channel",
            Self::SendDm => "send_dm",
            Self::RandomReply => "random_reply",
            Self::AddRole => "add_role",
            Self::RemoveRole => "remove_role",
            Self::DeleteMessage => "delete_message",
            Self::TimeoutUser => "timeout_user",
            Self::Unknown => "unknown",
        }
    }
}

impl From<String> for ActionKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "send_message" => Self::SendMessage,
            "send_channel" => Self::SendChannel,
            "send_dm" => Self::SendDm,
            "random_reply" => Self::RandomReply,
            "add_role" => Self::AddRole,
            "remove_role" => Self::RemoveRole,
            "delete_message" => Self::DeleteMessage,
            "timeout_user" => Self::TimeoutUser,
            _ => Self::Unknown,
        }
    }
}

impl From<ActionKind> for String {
    fn from(kind: ActionKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Visual style of a button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonStyle {
    Primary,
    Secondary,
    Success,
    Danger,
    Link,
}

/// An interactive button attached to a sent message
///
/// A `Link`-style button opens `url` client-side and is never dispatched
/// back to the bot; every other style is dispatched under its custom id and
/// may carry a nested action list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub style: ButtonStyle,
    #[serde(rename = "customId", default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
}

impl Button {
    /// Create a dispatchable button
    pub fn new(label: impl Into<String>, style: ButtonStyle) -> Self {
        Self {
            label: label.into(),
            style,
            custom_id: None,
            url: None,
            emoji: None,
            actions: Vec::new(),
        }
    }

    /// Set the custom identifier
    pub fn with_custom_id(mut self, id: impl Into<String>) -> Self {
        self.custom_id = Some(id.into());
        self
    }

    /// Set the nested action list
    pub fn with_actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = actions;
        self
    }
}

/// One option of a select menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    /// Option identity; interaction callbacks match on it
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
}

impl SelectOption {
    /// Create a new option
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            description: None,
            emoji: None,
            actions: Vec::new(),
        }
    }

    /// Set the nested action list
    pub fn with_actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = actions;
        self
    }
}

/// A select menu attached to a sent message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectMenu {
    /// Routes interaction callbacks back to this menu
    #[serde(rename = "customId")]
    pub custom_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(rename = "minValues", default, skip_serializing_if = "Option::is_none")]
    pub min_values: Option<u8>,
    #[serde(rename = "maxValues", default, skip_serializing_if = "Option::is_none")]
    pub max_values: Option<u8>,
    pub options: Vec<SelectOption>,
}

/// Embed override attached to a single action
///
/// Text fields are templates, resolved when the action runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbedTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

/// One declarative unit of bot behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    /// AND-combined gates; empty means unconditional
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    /// Message content template for sending actions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Candidate replies for `random_reply`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<String>,
    #[serde(rename = "channelId", default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<ChannelId>,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(rename = "roleId", default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<RoleId>,
    /// Timeout length in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<Button>,
    #[serde(rename = "selectMenu", default, skip_serializing_if = "Option::is_none")]
    pub select_menu: Option<SelectMenu>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed: Option<EmbedTemplate>,
}

impl Action {
    /// Create an action of the given kind with no payload
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            conditions: Vec::new(),
            content: None,
            messages: Vec::new(),
            channel_id: None,
            user_id: None,
            role_id: None,
            duration: None,
            buttons: Vec::new(),
            select_menu: None,
            embed: None,
        }
    }

    /// Create a `send_message` action with the given content template
    pub fn send_message(content: impl Into<String>) -> Self {
        let mut action = Self::new(ActionKind::SendMessage);
        action.content = Some(content.into());
        action
    }

    /// Add a gating condition
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Attach a button
    pub fn with_button(mut self, button: Button) -> Self {
        self.buttons.push(button);
        self
    }
}
