//! Action execution engine
//!
//! Walks a command's ordered action list, gates each action on its
//! conditions, resolves templates, and performs the concrete operation
//! through the effect sink. Interactive components register their nested
//! action lists under their custom identifier; when an interaction fires,
//! the dispatcher re-enters the engine with a fresh context and the engine
//! resolves the nested list by lookup, never by pointer.
//!
//! Actions run strictly in declared order. Each sink call completes before
//! the next action is considered, so a role granted by action N is visible
//! to a role condition on action N+1.

use crate::action::{Action, ActionKind, Button, ButtonStyle, SelectMenu};
use crate::command::{CommandDefinition, CommandEntry, CommandStore};
use crate::condition;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::sink::{
    EffectSink, MessageTarget, OutgoingMessage, RenderedButton, RenderedEmbed, RenderedSelect,
    RenderedSelectOption,
};
use crate::template;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Interaction chains deeper than this abort with `RecursionLimitExceeded`
pub const DEFAULT_MAX_DEPTH: u32 = 8;

/// Embed color used when a definition does not set one
const DEFAULT_EMBED_COLOR: &str = "#0099ff";

/// What happened to one action
#[derive(Debug)]
pub enum ActionStatus {
    /// Conditions held and the operation succeeded
    Completed,
    /// A condition did not hold; the action was not performed
    Skipped,
    /// The operation was attempted or rejected; siblings still ran
    Failed(Error),
}

impl ActionStatus {
    /// Whether the action completed
    pub fn is_completed(&self) -> bool {
        matches!(self, ActionStatus::Completed)
    }
}

/// Outcome of one action in an execution pass
#[derive(Debug)]
pub struct ActionOutcome {
    pub kind: ActionKind,
    pub status: ActionStatus,
}

/// Everything one invocation or interaction produced
#[derive(Debug, Default)]
pub struct ExecutionResult {
    /// Per-action outcomes, in execution order
    pub outcomes: Vec<ActionOutcome>,
    /// Whether anything was sent as a reply to the trigger
    pub replied: bool,
}

impl ExecutionResult {
    /// Whether every action completed
    pub fn all_completed(&self) -> bool {
        self.outcomes.iter().all(|o| o.status.is_completed())
    }

    fn merge(&mut self, other: ExecutionResult) {
        self.outcomes.extend(other.outcomes);
        self.replied |= other.replied;
    }
}

/// A nested action list registered under a component identifier
#[derive(Debug, Clone)]
struct ComponentBinding {
    actions: Vec<Action>,
    /// Interaction depth at which these actions will run
    depth: u32,
}

/// The registry key for one option of a select menu
pub fn select_component_id(custom_id: &str, value: &str) -> String {
    format!("{custom_id}:{value}")
}

/// The action execution engine
///
/// Holds the read-only definitions table and the component-action registry
/// populated by sent messages. One engine serves many concurrent
/// invocations; each invocation brings its own context and sink.
pub struct Engine<S> {
    store: S,
    components: Mutex<HashMap<String, ComponentBinding>>,
    max_depth: u32,
    button_seq: AtomicU64,
}

impl<S: CommandStore> Engine<S> {
    /// Create an engine over the given definitions table
    pub fn new(store: S) -> Self {
        Self {
            store,
            components: Mutex::new(HashMap::new()),
            max_depth: DEFAULT_MAX_DEPTH,
            button_seq: AtomicU64::new(0),
        }
    }

    /// Set the maximum interaction chain depth
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The definitions table this engine reads from
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run a command invocation
    pub async fn invoke(
        &self,
        name: &str,
        ctx: &mut Context,
        sink: &dyn EffectSink,
    ) -> Result<ExecutionResult> {
        let normalized = name.to_lowercase();
        let entry = self
            .store
            .command(&normalized)
            .ok_or_else(|| Error::UnknownCommand(normalized.clone()))?;
        match entry {
            CommandEntry::Literal(text) => {
                let message = OutgoingMessage {
                    embed: Some(literal_embed(&normalized, &text)),
                    ..OutgoingMessage::default()
                };
                sink.send_message(MessageTarget::Reply, message).await?;
                Ok(ExecutionResult {
                    outcomes: Vec::new(),
                    replied: true,
                })
            }
            CommandEntry::Structured(def) => {
                self.invoke_structured(&normalized, &def, ctx, sink).await
            }
        }
    }

    /// Run the nested action list registered under a component identifier
    ///
    /// For select menus the identifier is `select_component_id(custom_id,
    /// value)`; `handle_select` composes it for every chosen value.
    pub async fn handle_interaction(
        &self,
        component_id: &str,
        ctx: &mut Context,
        sink: &dyn EffectSink,
    ) -> Result<ExecutionResult> {
        let binding = self
            .binding(component_id)
            .ok_or_else(|| Error::UnknownComponent(component_id.to_string()))?;
        self.run_binding(binding, ctx, sink).await
    }

    /// Run the action lists of every chosen select option
    pub async fn handle_select(
        &self,
        custom_id: &str,
        values: &[String],
        ctx: &mut Context,
        sink: &dyn EffectSink,
    ) -> Result<ExecutionResult> {
        let mut result = ExecutionResult::default();
        let mut matched = false;
        for value in values {
            let key = select_component_id(custom_id, value);
            if let Some(binding) = self.binding(&key) {
                matched = true;
                result.merge(self.run_binding(binding, ctx, sink).await?);
            }
        }
        if !matched {
            return Err(Error::UnknownComponent(custom_id.to_string()));
        }
        Ok(result)
    }

    async fn run_binding(
        &self,
        binding: ComponentBinding,
        ctx: &mut Context,
        sink: &dyn EffectSink,
    ) -> Result<ExecutionResult> {
        if binding.depth > self.max_depth {
            return Err(Error::RecursionLimitExceeded {
                limit: self.max_depth,
            });
        }
        let mut result = ExecutionResult::default();
        self.run_actions(&binding.actions, binding.depth, ctx, sink, &mut result)
            .await;
        Ok(result)
    }

    async fn invoke_structured(
        &self,
        name: &str,
        def: &CommandDefinition,
        ctx: &mut Context,
        sink: &dyn EffectSink,
    ) -> Result<ExecutionResult> {
        if def.needs_confirmation() && !def.actions.is_empty() {
            return self.send_confirmation(name, def, sink).await;
        }

        let mut result = ExecutionResult::default();
        self.run_actions(&def.actions, 0, ctx, sink, &mut result)
            .await;

        if !result.replied {
            let description = template::resolve(&def.description, ctx);
            let message = if def.actions.is_empty() || !description.trim().is_empty() {
                OutgoingMessage {
                    embed: Some(command_embed(name, def, description)),
                    ..OutgoingMessage::default()
                }
            } else {
                // actions ran but none replied; acknowledge the trigger
                OutgoingMessage::text("\u{2705}")
            };
            match sink.send_message(MessageTarget::Reply, message).await {
                Ok(_) => result.replied = true,
                // a description-only command has no other effect to report
                Err(error) if def.actions.is_empty() => return Err(error.into()),
                Err(error) => {
                    tracing::warn!(command = name, %error, "failed to send trailing reply");
                }
            }
        }
        Ok(result)
    }

    /// Hold the root actions behind a confirm button instead of running them
    async fn send_confirmation(
        &self,
        name: &str,
        def: &CommandDefinition,
        sink: &dyn EffectSink,
    ) -> Result<ExecutionResult> {
        let custom_id = format!("confirm:{name}");
        self.bind(custom_id.clone(), def.actions.clone(), 1);
        let content = def
            .confirmation_message
            .clone()
            .unwrap_or_else(|| "Are you sure?".to_string());
        let message = OutgoingMessage {
            content,
            buttons: vec![RenderedButton {
                label: "Confirm".to_string(),
                style: ButtonStyle::Primary,
                custom_id: Some(custom_id),
                url: None,
                emoji: None,
            }],
            ..OutgoingMessage::default()
        };
        sink.send_message(MessageTarget::Reply, message).await?;
        Ok(ExecutionResult {
            outcomes: Vec::new(),
            replied: true,
        })
    }

    async fn run_actions(
        &self,
        actions: &[Action],
        depth: u32,
        ctx: &mut Context,
        sink: &dyn EffectSink,
        result: &mut ExecutionResult,
    ) {
        for action in actions {
            let status = self.run_action(action, depth, ctx, sink, result).await;
            if let ActionStatus::Failed(error) = &status {
                tracing::warn!(kind = ?action.kind, %error, "action failed");
            }
            result.outcomes.push(ActionOutcome {
                kind: action.kind,
                status,
            });
        }
    }

    async fn run_action(
        &self,
        action: &Action,
        depth: u32,
        ctx: &mut Context,
        sink: &dyn EffectSink,
        result: &mut ExecutionResult,
    ) -> ActionStatus {
        match condition::passes_all(&action.conditions, ctx, sink).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(kind = ?action.kind, "action skipped by conditions");
                return ActionStatus::Skipped;
            }
            Err(error) => return ActionStatus::Failed(error),
        }

        match action.kind {
            ActionKind::SendMessage | ActionKind::RandomReply => {
                self.send(action, MessageTarget::Reply, depth, ctx, sink, result)
                    .await
            }
            ActionKind::SendChannel => match &action.channel_id {
                Some(channel) => {
                    let target = MessageTarget::Channel(channel.clone());
                    self.send(action, target, depth, ctx, sink, result).await
                }
                None => ActionStatus::Failed(Error::MissingField("channelId")),
            },
            ActionKind::SendDm => {
                let user = action
                    .user_id
                    .clone()
                    .unwrap_or_else(|| ctx.invoker().id.clone());
                self.send(action, MessageTarget::Dm(user), depth, ctx, sink, result)
                    .await
            }
            ActionKind::AddRole | ActionKind::RemoveRole => {
                let Some(role) = &action.role_id else {
                    return ActionStatus::Failed(Error::MissingField("roleId"));
                };
                let add = action.kind == ActionKind::AddRole;
                match sink.mutate_role(&ctx.invoker().id, role, add).await {
                    Ok(()) => ActionStatus::Completed,
                    Err(error) => ActionStatus::Failed(error.into()),
                }
            }
            ActionKind::DeleteMessage => match ctx.trigger_message() {
                Some(handle) => match sink.delete_message(handle).await {
                    Ok(()) => ActionStatus::Completed,
                    Err(error) => ActionStatus::Failed(error.into()),
                },
                None => ActionStatus::Failed(Error::MissingField("trigger message")),
            },
            ActionKind::TimeoutUser => {
                let duration = action.duration.unwrap_or(0);
                if duration <= 0 {
                    return ActionStatus::Failed(Error::MissingField("duration"));
                }
                let user = action
                    .user_id
                    .clone()
                    .unwrap_or_else(|| ctx.invoker().id.clone());
                match sink.timeout_user(&user, duration as u64).await {
                    Ok(()) => ActionStatus::Completed,
                    Err(error) => ActionStatus::Failed(error.into()),
                }
            }
            ActionKind::Unknown => ActionStatus::Failed(Error::UnsupportedAction),
        }
    }

    /// Resolve and send one message-producing action
    async fn send(
        &self,
        action: &Action,
        target: MessageTarget,
        depth: u32,
        ctx: &mut Context,
        sink: &dyn EffectSink,
        result: &mut ExecutionResult,
    ) -> ActionStatus {
        // random_reply picks one of messages, falling back to content when empty
        let content = if action.kind == ActionKind::RandomReply && !action.messages.is_empty() {
            let index = ctx.roll(0, action.messages.len() as i64 - 1) as usize;
            template::resolve(&action.messages[index], ctx)
        } else {
            template::resolve(action.content.as_deref().unwrap_or(""), ctx)
        };
        let message = OutgoingMessage {
            content,
            embed: action.embed.as_ref().map(|e| {
                RenderedEmbed {
                    title: e.title.as_deref().map(|t| template::resolve(t, ctx)),
                    description: e.description.as_deref().map(|t| template::resolve(t, ctx)),
                    color: e.color.clone(),
                    image: e.image.clone(),
                    thumbnail: e.thumbnail.clone(),
                    footer: e.footer.as_deref().map(|t| template::resolve(t, ctx)),
                    ..RenderedEmbed::default()
                }
            }),
            buttons: self.render_buttons(&action.buttons, depth),
            select_menu: action
                .select_menu
                .as_ref()
                .map(|menu| self.render_select(menu, depth)),
        };
        let is_reply = target == MessageTarget::Reply;
        match sink.send_message(target, message).await {
            Ok(_) => {
                if is_reply {
                    result.replied = true;
                }
                ActionStatus::Completed
            }
            Err(error) => ActionStatus::Failed(error.into()),
        }
    }

    /// Render buttons, registering nested action lists for dispatch
    fn render_buttons(&self, buttons: &[Button], depth: u32) -> Vec<RenderedButton> {
        buttons
            .iter()
            .map(|button| {
                if button.style == ButtonStyle::Link {
                    RenderedButton {
                        label: button.label.clone(),
                        style: button.style,
                        custom_id: None,
                        url: button.url.clone(),
                        emoji: button.emoji.clone(),
                    }
                } else {
                    let custom_id = button
                        .custom_id
                        .clone()
                        .unwrap_or_else(|| self.next_button_id());
                    if !button.actions.is_empty() {
                        self.bind(custom_id.clone(), button.actions.clone(), depth + 1);
                    }
                    RenderedButton {
                        label: button.label.clone(),
                        style: button.style,
                        custom_id: Some(custom_id),
                        url: None,
                        emoji: button.emoji.clone(),
                    }
                }
            })
            .collect()
    }

    /// Render a select menu, registering per-option action lists
    fn render_select(&self, menu: &SelectMenu, depth: u32) -> RenderedSelect {
        for option in &menu.options {
            if !option.actions.is_empty() {
                self.bind(
                    select_component_id(&menu.custom_id, &option.value),
                    option.actions.clone(),
                    depth + 1,
                );
            }
        }
        RenderedSelect {
            custom_id: menu.custom_id.clone(),
            placeholder: menu.placeholder.clone(),
            min_values: menu.min_values,
            max_values: menu.max_values,
            options: menu
                .options
                .iter()
                .map(|option| RenderedSelectOption {
                    label: option.label.clone(),
                    value: option.value.clone(),
                    description: option.description.clone(),
                    emoji: option.emoji.clone(),
                })
                .collect(),
        }
    }

    fn bind(&self, component_id: String, actions: Vec<Action>, depth: u32) {
        let mut components = self
            .components
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        components.insert(component_id, ComponentBinding { actions, depth });
    }

    fn binding(&self, component_id: &str) -> Option<ComponentBinding> {
        let components = self
            .components
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        components.get(component_id).cloned()
    }

    fn next_button_id(&self) -> String {
        format!("btn:{}", self.button_seq.fetch_add(1, Ordering::Relaxed))
    }
}

/// Embed for a bare-string command reply
///
/// Literal replies are sent verbatim; templates are only resolved for
/// structured definitions.
fn literal_embed(name: &str, text: &str) -> RenderedEmbed {
    RenderedEmbed {
        title: Some(name.to_uppercase()),
        description: Some(text.to_string()),
        color: Some(DEFAULT_EMBED_COLOR.to_string()),
        ..RenderedEmbed::default()
    }
}

/// Embed for a structured command's top-level reply
fn command_embed(name: &str, def: &CommandDefinition, description: String) -> RenderedEmbed {
    RenderedEmbed {
        title: Some(def.title.clone().unwrap_or_else(|| name.to_uppercase())),
        description: (!description.trim().is_empty()).then_some(description),
        color: def
            .color
            .clone()
            .or_else(|| Some(DEFAULT_EMBED_COLOR.to_string())),
        author_name: def.author_name.clone(),
        author_url: def.author_url.clone(),
        author_icon: def.author_icon.clone(),
        image: def.gif.clone(),
        thumbnail: def.thumbnail_url.clone(),
        footer: def.footer_text.clone(),
        footer_icon: def.footer_icon.clone(),
    }
}
