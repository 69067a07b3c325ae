//! Identity types for users, roles and channels
//!
//! Chat platforms hand out snowflake identifiers as decimal strings, and the
//! persisted command book stores them that way. The newtypes keep the three
//! id spaces from being mixed up in sink calls.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a user account
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

/// Identifier of a server role
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(pub String);

/// Identifier of a channel
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub String);

macro_rules! id_impls {
    ($name:ident) => {
        impl $name {
            /// Create a new id
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the id as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

id_impls!(UserId);
id_impls!(RoleId);
id_impls!(ChannelId);
