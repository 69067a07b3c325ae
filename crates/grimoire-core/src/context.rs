//! Per-invocation evaluation context
//!
//! A context is built for one trigger event (a command invocation or a
//! component interaction) and lives for exactly one pass through the
//! executor. Apart from random draws it is read-only.

use crate::id::UserId;
use crate::rng::{RandomSource, XorShift64};
use crate::sink::MessageHandle;
use std::fmt;

/// The user who triggered the invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoker {
    pub id: UserId,
    pub username: String,
    pub display_name: String,
}

impl Invoker {
    /// Create a new invoker
    pub fn new(
        id: impl Into<UserId>,
        username: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            display_name: display_name.into(),
        }
    }

    /// The mention handle for this user
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

/// The server the invocation happened in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Server {
    pub id: String,
    pub name: String,
}

impl Server {
    /// Create a new server
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Read-only data for one evaluation pass
///
/// Carries the invoking user, the server, the positional arguments of the
/// invocation and the random source used by chance conditions and
/// `random(..)` placeholders.
pub struct Context {
    invoker: Invoker,
    server: Server,
    args: Vec<String>,
    rng: Box<dyn RandomSource>,
    trigger_message: Option<MessageHandle>,
}

impl Context {
    /// Create a context with a wall-clock-seeded random source
    pub fn new(invoker: Invoker, server: Server) -> Self {
        Self {
            invoker,
            server,
            args: Vec::new(),
            rng: Box::new(XorShift64::from_entropy()),
            trigger_message: None,
        }
    }

    /// Set the positional arguments
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the random source
    pub fn with_random_source(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Attach the handle of the message that carried the trigger
    ///
    /// For component interactions this is the message hosting the component;
    /// `delete_message` actions operate on it.
    pub fn with_trigger_message(mut self, handle: MessageHandle) -> Self {
        self.trigger_message = Some(handle);
        self
    }

    /// The invoking user
    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    /// The server of the invocation
    pub fn server(&self) -> &Server {
        &self.server
    }

    /// All positional arguments, in order
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// A positional argument by 0-based index
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// The triggering message, if the trigger carried one
    pub fn trigger_message(&self) -> Option<&MessageHandle> {
        self.trigger_message.as_ref()
    }

    /// Draw one integer uniformly from `[min, max]`
    pub fn roll(&mut self, min: i64, max: i64) -> i64 {
        self.rng.uniform_int(min, max)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("invoker", &self.invoker)
            .field("server", &self.server)
            .field("args", &self.args)
            .field("trigger_message", &self.trigger_message)
            .finish()
    }
}
