//! Effect sink abstraction
//!
//! The sink is the collaborator that performs real platform operations:
//! sending messages, mutating roles, timing users out, and answering the
//! membership queries that gate conditions. The engine only ever talks to
//! this trait; a concrete client binds it to an actual chat platform, and
//! tests bind it to a recorder.

use crate::action::ButtonStyle;
use crate::id::{ChannelId, RoleId, UserId};
use async_trait::async_trait;
use thiserror::Error;

/// Failure performing a concrete platform operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    #[error("missing permission: {0}")]
    MissingPermission(String),
    #[error("target not found: {0}")]
    NotFound(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("operation timed out")]
    Timeout,
}

/// Result type for sink operations
pub type SinkResult<T> = std::result::Result<T, SinkError>;

/// Where an outgoing message goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageTarget {
    /// Reply to the triggering invocation or interaction
    Reply,
    /// Post into a specific channel
    Channel(ChannelId),
    /// Direct message to a user
    Dm(UserId),
}

/// Handle to a message the sink has sent or observed
///
/// Opaque to the engine; it is only ever handed back to the sink (for
/// deleting the triggering message).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHandle {
    pub channel_id: ChannelId,
    pub message_id: String,
}

impl MessageHandle {
    /// Create a new handle
    pub fn new(channel_id: impl Into<ChannelId>, message_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            message_id: message_id.into(),
        }
    }
}

/// A fully resolved message, ready for the sink
///
/// All template placeholders have been expanded and all interactive
/// components carry their final custom identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub content: String,
    pub embed: Option<RenderedEmbed>,
    pub buttons: Vec<RenderedButton>,
    pub select_menu: Option<RenderedSelect>,
}

impl OutgoingMessage {
    /// Create a plain text message
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }
}

/// A resolved embed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedEmbed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub author_name: Option<String>,
    pub author_url: Option<String>,
    pub author_icon: Option<String>,
    pub image: Option<String>,
    pub thumbnail: Option<String>,
    pub footer: Option<String>,
    pub footer_icon: Option<String>,
}

/// A resolved button
///
/// Exactly one of `custom_id` (dispatched back to the engine) or `url`
/// (client-side navigation) is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedButton {
    pub label: String,
    pub style: ButtonStyle,
    pub custom_id: Option<String>,
    pub url: Option<String>,
    pub emoji: Option<String>,
}

/// A resolved select menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSelect {
    pub custom_id: String,
    pub placeholder: Option<String>,
    pub min_values: Option<u8>,
    pub max_values: Option<u8>,
    pub options: Vec<RenderedSelectOption>,
}

/// One option in a resolved select menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSelectOption {
    pub label: String,
    pub value: String,
    pub description: Option<String>,
    pub emoji: Option<String>,
}

/// The collaborator performing concrete platform side effects
///
/// All operations are asynchronous and fallible. Membership queries answer
/// for the invocation the sink was built for (the sink is bound to one
/// triggering event by the dispatch layer).
#[async_trait]
pub trait EffectSink: Send + Sync {
    /// Send a message and return a handle to it
    async fn send_message(
        &self,
        target: MessageTarget,
        message: OutgoingMessage,
    ) -> SinkResult<MessageHandle>;

    /// Add (`add = true`) or remove a role on a user
    async fn mutate_role(&self, user: &UserId, role: &RoleId, add: bool) -> SinkResult<()>;

    /// Delete a previously sent or observed message
    async fn delete_message(&self, handle: &MessageHandle) -> SinkResult<()>;

    /// Time a user out for the given number of seconds
    async fn timeout_user(&self, user: &UserId, duration_seconds: u64) -> SinkResult<()>;

    /// Whether the user holds the named permission
    async fn has_permission(&self, user: &UserId, permission: &str) -> SinkResult<bool>;

    /// Whether the user carries the role
    async fn has_role(&self, user: &UserId, role: &RoleId) -> SinkResult<bool>;

    /// Whether the user carries a role with the given display name
    async fn has_role_named(&self, user: &UserId, role_name: &str) -> SinkResult<bool>;

    /// Whether the triggering event happened in the given channel
    async fn in_channel(&self, channel: &ChannelId) -> SinkResult<bool>;

    /// Whether the triggering user is the given user
    async fn is_user(&self, user: &UserId) -> SinkResult<bool>;
}
