//! Condition evaluation
//!
//! Every action may carry a list of conditions; the executor only performs
//! the action when all of them hold. Comparison and chance conditions are
//! pure; permission, role, channel and user conditions delegate to the
//! effect sink's membership queries.

use crate::context::Context;
use crate::error::{Error, Result};
use crate::id::{ChannelId, RoleId, UserId};
use crate::sink::EffectSink;
use crate::template;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operator for `comparison` conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
}

impl Operator {
    /// Whether this operator compares numerically
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Gt | Self::Lt | Self::Ge | Self::Le)
    }
}

/// A comparison operand as stored: a bare number or a template string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Int(i) => write!(f, "{}", i),
            Operand::Float(x) => write!(f, "{}", x),
            Operand::Text(s) => write!(f, "{}", s),
        }
    }
}

impl Operand {
    /// Resolve this operand against the context
    fn resolve(&self, ctx: &mut Context) -> String {
        template::resolve(&self.to_string(), ctx)
    }
}

/// A single gating condition
///
/// Serialized as a flat object with a `type` tag; each variant carries only
/// the fields it needs. Unknown tags deserialize into [`Condition::Unknown`]
/// so stale stored data surfaces at evaluation time instead of failing the
/// whole book at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// Compare two resolved operands
    Comparison {
        value1: Operand,
        operator: Operator,
        value2: Operand,
    },
    /// Pass with the given percentage probability
    Chance { chance: i64 },
    /// Invoking user holds a permission
    Permission { permission: String },
    /// Invoking user carries a role, by id and/or name
    Role {
        #[serde(rename = "roleId", default, skip_serializing_if = "Option::is_none")]
        role_id: Option<RoleId>,
        #[serde(rename = "roleName", default, skip_serializing_if = "Option::is_none")]
        role_name: Option<String>,
    },
    /// Trigger happened in a specific channel
    Channel {
        #[serde(rename = "channelId")]
        channel_id: ChannelId,
    },
    /// Invoking user is a specific user
    User {
        #[serde(rename = "userId")]
        user_id: UserId,
    },
    /// Catch-all for condition types this build does not know
    #[serde(other)]
    Unknown,
}

impl Condition {
    /// Evaluate this condition against the context and sink
    ///
    /// Comparison conditions fail closed: a numeric operator over a
    /// non-numeric operand yields `false`, never an error. Sink query
    /// failures and unknown condition types propagate as errors.
    pub async fn evaluate(&self, ctx: &mut Context, sink: &dyn EffectSink) -> Result<bool> {
        match self {
            Condition::Comparison {
                value1,
                operator,
                value2,
            } => {
                let lhs = value1.resolve(ctx);
                let rhs = value2.resolve(ctx);
                Ok(compare(&lhs, *operator, &rhs))
            }
            Condition::Chance { chance } => {
                // one draw from [0, 100); strictly below the threshold
                let draw = ctx.roll(0, 99);
                Ok(draw < *chance)
            }
            Condition::Permission { permission } => {
                Ok(sink.has_permission(&ctx.invoker().id, permission).await?)
            }
            Condition::Role { role_id, role_name } => {
                if let Some(role) = role_id {
                    return Ok(sink.has_role(&ctx.invoker().id, role).await?);
                }
                if let Some(name) = role_name {
                    return Ok(sink.has_role_named(&ctx.invoker().id, name).await?);
                }
                Ok(false)
            }
            Condition::Channel { channel_id } => Ok(sink.in_channel(channel_id).await?),
            Condition::User { user_id } => Ok(sink.is_user(user_id).await?),
            Condition::Unknown => Err(Error::UnsupportedCondition),
        }
    }
}

/// Compare two resolved operand strings
fn compare(lhs: &str, operator: Operator, rhs: &str) -> bool {
    if operator.is_numeric() {
        let (Ok(a), Ok(b)) = (lhs.trim().parse::<f64>(), rhs.trim().parse::<f64>()) else {
            tracing::debug!(lhs, rhs, "non-numeric comparison operand, failing closed");
            return false;
        };
        match operator {
            Operator::Gt => a > b,
            Operator::Lt => a < b,
            Operator::Ge => a >= b,
            Operator::Le => a <= b,
            _ => false,
        }
    } else {
        match operator {
            Operator::Eq => lhs == rhs,
            Operator::Ne => lhs != rhs,
            _ => false,
        }
    }
}

/// Evaluate an AND-combined condition list
///
/// An empty list is unconditional. The first condition that does not hold
/// short-circuits the rest.
pub async fn passes_all(
    conditions: &[Condition],
    ctx: &mut Context,
    sink: &dyn EffectSink,
) -> Result<bool> {
    for condition in conditions {
        if !condition.evaluate(ctx, sink).await? {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Invoker, Server};
    use crate::rng::SequenceSource;
    use crate::sink::{
        MessageHandle, MessageTarget, OutgoingMessage, SinkError, SinkResult,
    };
    use async_trait::async_trait;

    fn context() -> Context {
        Context::new(
            Invoker::new("42", "alice", "Alice"),
            Server::new("10", "Wonderland"),
        )
    }

    /// Sink whose membership answers are fixed up front
    struct QuerySink {
        permissions: Vec<String>,
        roles: Vec<RoleId>,
        role_names: Vec<String>,
        channel: ChannelId,
        user: UserId,
    }

    impl Default for QuerySink {
        fn default() -> Self {
            Self {
                permissions: Vec::new(),
                roles: Vec::new(),
                role_names: Vec::new(),
                channel: ChannelId::new("100"),
                user: UserId::new("42"),
            }
        }
    }

    #[async_trait]
    impl EffectSink for QuerySink {
        async fn send_message(
            &self,
            _target: MessageTarget,
            _message: OutgoingMessage,
        ) -> SinkResult<MessageHandle> {
            Err(SinkError::Transport("not a sending sink".into()))
        }

        async fn mutate_role(&self, _user: &UserId, _role: &RoleId, _add: bool) -> SinkResult<()> {
            Ok(())
        }

        async fn delete_message(&self, _handle: &MessageHandle) -> SinkResult<()> {
            Ok(())
        }

        async fn timeout_user(&self, _user: &UserId, _duration_seconds: u64) -> SinkResult<()> {
            Ok(())
        }

        async fn has_permission(&self, _user: &UserId, permission: &str) -> SinkResult<bool> {
            Ok(self.permissions.iter().any(|p| p == permission))
        }

        async fn has_role(&self, _user: &UserId, role: &RoleId) -> SinkResult<bool> {
            Ok(self.roles.contains(role))
        }

        async fn has_role_named(&self, _user: &UserId, role_name: &str) -> SinkResult<bool> {
            Ok(self.role_names.iter().any(|n| n == role_name))
        }

        async fn in_channel(&self, channel: &ChannelId) -> SinkResult<bool> {
            Ok(*channel == self.channel)
        }

        async fn is_user(&self, user: &UserId) -> SinkResult<bool> {
            Ok(*user == self.user)
        }
    }

    fn comparison(v1: Operand, op: Operator, v2: Operand) -> Condition {
        Condition::Comparison {
            value1: v1,
            operator: op,
            value2: v2,
        }
    }

    #[tokio::test]
    async fn test_numeric_comparison() {
        let mut ctx = context();
        let sink = QuerySink::default();
        let cond = comparison(
            Operand::Text("5".into()),
            Operator::Gt,
            Operand::Text("3".into()),
        );
        assert!(cond.evaluate(&mut ctx, &sink).await.unwrap());
    }

    #[tokio::test]
    async fn test_non_numeric_comparison_fails_closed() {
        let mut ctx = context();
        let sink = QuerySink::default();
        let cond = comparison(
            Operand::Text("abc".into()),
            Operator::Gt,
            Operand::Text("3".into()),
        );
        assert!(!cond.evaluate(&mut ctx, &sink).await.unwrap());
    }

    #[tokio::test]
    async fn test_equality_compares_strings() {
        let mut ctx = context();
        let sink = QuerySink::default();
        let eq = comparison(
            Operand::Text("abc".into()),
            Operator::Eq,
            Operand::Text("abc".into()),
        );
        assert!(eq.evaluate(&mut ctx, &sink).await.unwrap());
        let ne = comparison(Operand::Int(5), Operator::Ne, Operand::Text("5".into()));
        assert!(!ne.evaluate(&mut ctx, &sink).await.unwrap());
    }

    #[tokio::test]
    async fn test_comparison_resolves_templates_first() {
        let mut ctx = context().with_args(["7"]);
        let sink = QuerySink::default();
        let cond = comparison(
            Operand::Text("{{ arguments.get(0) }}".into()),
            Operator::Ge,
            Operand::Int(5),
        );
        assert!(cond.evaluate(&mut ctx, &sink).await.unwrap());
    }

    #[tokio::test]
    async fn test_chance_boundaries() {
        let sink = QuerySink::default();
        // highest possible draw still passes chance=100
        let mut ctx = context().with_random_source(SequenceSource::new([99, 0]));
        let always = Condition::Chance { chance: 100 };
        assert!(always.evaluate(&mut ctx, &sink).await.unwrap());
        // lowest possible draw still fails chance=0
        let never = Condition::Chance { chance: 0 };
        assert!(!never.evaluate(&mut ctx, &sink).await.unwrap());
    }

    #[tokio::test]
    async fn test_chance_threshold_is_strict() {
        let sink = QuerySink::default();
        let cond = Condition::Chance { chance: 50 };
        let mut ctx = context().with_random_source(SequenceSource::new([49, 50]));
        assert!(cond.evaluate(&mut ctx, &sink).await.unwrap());
        assert!(!cond.evaluate(&mut ctx, &sink).await.unwrap());
    }

    #[tokio::test]
    async fn test_role_by_id_and_name() {
        let mut ctx = context();
        let sink = QuerySink {
            roles: vec![RoleId::new("5")],
            role_names: vec!["Wizards".into()],
            ..QuerySink::default()
        };
        let by_id = Condition::Role {
            role_id: Some(RoleId::new("5")),
            role_name: None,
        };
        assert!(by_id.evaluate(&mut ctx, &sink).await.unwrap());
        let by_name = Condition::Role {
            role_id: None,
            role_name: Some("Wizards".into()),
        };
        assert!(by_name.evaluate(&mut ctx, &sink).await.unwrap());
        let neither = Condition::Role {
            role_id: None,
            role_name: None,
        };
        assert!(!neither.evaluate(&mut ctx, &sink).await.unwrap());
    }

    #[tokio::test]
    async fn test_and_combination() {
        let mut ctx = context();
        let sink = QuerySink::default();
        let yes = Condition::Chance { chance: 100 };
        let no = Condition::Chance { chance: 0 };
        assert!(passes_all(&[], &mut ctx, &sink).await.unwrap());
        assert!(
            !passes_all(&[yes.clone(), no], &mut ctx, &sink)
                .await
                .unwrap()
        );
        assert!(passes_all(&[yes.clone(), yes], &mut ctx, &sink).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_condition_is_an_error() {
        let mut ctx = context();
        let sink = QuerySink::default();
        let err = Condition::Unknown.evaluate(&mut ctx, &sink).await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedCondition));
    }

    #[test]
    fn test_unknown_tag_deserializes_to_unknown() {
        let cond: Condition =
            serde_json::from_str(r#"{"type":"moon_phase","phase":"full"}"#).unwrap();
        assert_eq!(cond, Condition::Unknown);
    }

    #[test]
    fn test_wire_shape() {
        let cond: Condition = serde_json::from_str(
            r#"{"type":"comparison","value1":"{{ arguments.get(0) }}","operator":">=","value2":10}"#,
        )
        .unwrap();
        assert!(matches!(
            cond,
            Condition::Comparison {
                operator: Operator::Ge,
                ..
            }
        ));
        let role: Condition = serde_json::from_str(r#"{"type":"role","roleId":"5"}"#).unwrap();
        let back = serde_json::to_value(&role).unwrap();
        assert_eq!(back, serde_json::json!({"type": "role", "roleId": "5"}));
    }
}
