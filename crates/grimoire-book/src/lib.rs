//! Grimoire Book - persistent store collaborators for the grimoire engine
//!
//! Implements the two small collaborator interfaces the engine consumes:
//! - [`JsonStore`]: the JSON command book on disk (or in memory), with
//!   authoring-time validation and lossless round-tripping
//! - [`CooldownGate`]: per-(user, command) cooldown bookkeeping consulted by
//!   the dispatch layer before it enters the engine

mod cooldown;
mod error;
mod store;

pub use cooldown::CooldownGate;
pub use error::{Error, Result};
pub use store::JsonStore;
