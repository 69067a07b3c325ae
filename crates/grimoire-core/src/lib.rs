//! Grimoire Core - declarative action rule engine for bot custom commands
//!
//! This crate provides the data model and evaluation engine for authored
//! custom commands:
//! - Command definitions (`CommandEntry`, `CommandDefinition`) and their
//!   ordered table (`CommandBook`)
//! - Template resolution against a per-invocation `Context`
//! - Gating conditions (comparison, chance, permission, role, channel, user)
//! - Actions with interactive components whose nested action lists re-enter
//!   the engine on interaction
//! - Author-time validation and the invocation-time error taxonomy
//!
//! Side effects never happen here directly: the engine calls the
//! [`EffectSink`] collaborator, and randomness flows through the
//! [`RandomSource`] carried by the context, so every evaluation is
//! replayable in tests.

mod action;
mod command;
mod condition;
mod context;
mod error;
mod executor;
mod id;
mod rng;
mod sink;
pub mod template;
mod validate;

pub use action::{Action, ActionKind, Button, ButtonStyle, EmbedTemplate, SelectMenu, SelectOption};
pub use command::{CommandBook, CommandDefinition, CommandEntry, CommandStore};
pub use condition::{passes_all, Condition, Operand, Operator};
pub use context::{Context, Invoker, Server};
pub use error::{Error, Result};
pub use executor::{
    select_component_id, ActionOutcome, ActionStatus, Engine, ExecutionResult, DEFAULT_MAX_DEPTH,
};
pub use id::{ChannelId, RoleId, UserId};
pub use rng::{RandomSource, SequenceSource, XorShift64};
pub use sink::{
    EffectSink, MessageHandle, MessageTarget, OutgoingMessage, RenderedButton, RenderedEmbed,
    RenderedSelect, RenderedSelectOption, SinkError, SinkResult,
};
pub use template::TemplateSyntaxWarning;
pub use validate::{validate, ValidationError, ValidationReport};
