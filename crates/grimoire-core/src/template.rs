//! Template resolution
//!
//! Command content is stored with `{{ expr }}` placeholders that expand
//! against the invocation context. The grammar is fixed and flat:
//!
//! - `user.mention`, `user.name`, `user.displayName`, `user.id`
//! - `server.name`
//! - `random(min, max)` — inclusive integer bounds, drawn from the context
//! - `round(x)` — nearest integer, half away from zero
//! - `arguments.get(i)` — 0-based positional argument, empty when absent
//!
//! Resolution is lenient: anything that is not a recognized placeholder is
//! left in place verbatim, so a partially malformed template still renders.

use crate::context::Context;
use thiserror::Error;

/// Unbalanced `{{` / `}}` markers in a stored template
///
/// Non-fatal: the template is still stored and resolution is still
/// attempted. Surfaced in validation reports and logged at resolve time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unbalanced placeholder markers: {opening} opening vs {closing} closing")]
pub struct TemplateSyntaxWarning {
    pub opening: usize,
    pub closing: usize,
}

/// A recognized placeholder expression
#[derive(Debug, Clone, PartialEq)]
enum Placeholder {
    UserMention,
    UserName,
    UserDisplayName,
    UserId,
    ServerName,
    Random(i64, i64),
    Round(f64),
    Argument(usize),
}

impl Placeholder {
    /// Parse a trimmed placeholder expression; `None` means unrecognized
    fn parse(expr: &str) -> Option<Self> {
        match expr {
            "user.mention" => return Some(Self::UserMention),
            "user.name" => return Some(Self::UserName),
            "user.displayName" => return Some(Self::UserDisplayName),
            "user.id" => return Some(Self::UserId),
            "server.name" => return Some(Self::ServerName),
            _ => {}
        }
        if let Some(args) = call_args(expr, "random") {
            let mut parts = args.splitn(2, ',');
            let min = parts.next()?.trim().parse().ok()?;
            let max = parts.next()?.trim().parse().ok()?;
            return Some(Self::Random(min, max));
        }
        if let Some(arg) = call_args(expr, "round") {
            let value = arg.trim().parse().ok()?;
            return Some(Self::Round(value));
        }
        if let Some(arg) = call_args(expr, "arguments.get") {
            let index = arg.trim().parse().ok()?;
            return Some(Self::Argument(index));
        }
        None
    }

    /// Expand into literal text
    fn resolve(&self, ctx: &mut Context) -> String {
        match self {
            Self::UserMention => ctx.invoker().mention(),
            Self::UserName => ctx.invoker().username.clone(),
            Self::UserDisplayName => ctx.invoker().display_name.clone(),
            Self::UserId => ctx.invoker().id.to_string(),
            Self::ServerName => ctx.server().name.clone(),
            Self::Random(min, max) => {
                let (lo, hi) = if min <= max { (*min, *max) } else { (*max, *min) };
                ctx.roll(lo, hi).to_string()
            }
            // f64::round rounds half away from zero
            Self::Round(x) => format!("{}", x.round() as i64),
            Self::Argument(index) => ctx.arg(*index).unwrap_or("").to_string(),
        }
    }
}

/// Extract `args` from an expression of the form `name(args)`
fn call_args<'a>(expr: &'a str, name: &str) -> Option<&'a str> {
    expr.strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

/// Check that `{{` and `}}` markers pair up
pub fn check(template: &str) -> Result<(), TemplateSyntaxWarning> {
    let opening = template.matches("{{").count();
    let closing = template.matches("}}").count();
    if opening == closing {
        Ok(())
    } else {
        Err(TemplateSyntaxWarning { opening, closing })
    }
}

/// Resolve all recognized placeholders in `template` against `ctx`
///
/// Unrecognized placeholders and unterminated markers pass through
/// verbatim; an unbalanced template is logged and still resolved.
pub fn resolve(template: &str, ctx: &mut Context) -> String {
    if let Err(warning) = check(template) {
        tracing::warn!(%warning, "resolving template with unbalanced markers");
    }

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            None => {
                // unterminated marker: keep the tail as-is
                out.push_str(&rest[start..]);
                rest = "";
                break;
            }
            Some(end) => {
                match Placeholder::parse(after[..end].trim()) {
                    Some(placeholder) => out.push_str(&placeholder.resolve(ctx)),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Invoker, Server};
    use crate::rng::SequenceSource;

    fn context() -> Context {
        Context::new(
            Invoker::new("42", "alice", "Alice"),
            Server::new("10", "Wonderland"),
        )
    }

    #[test]
    fn test_user_placeholders() {
        let mut ctx = context();
        assert_eq!(resolve("hi {{ user.mention }}", &mut ctx), "hi <@42>");
        assert_eq!(resolve("{{ user.name }}", &mut ctx), "alice");
        assert_eq!(resolve("{{ user.displayName }}", &mut ctx), "Alice");
        assert_eq!(resolve("{{ user.id }}", &mut ctx), "42");
        assert_eq!(resolve("{{ server.name }}", &mut ctx), "Wonderland");
    }

    #[test]
    fn test_random_degenerate() {
        let mut ctx = context();
        assert_eq!(resolve("{{ random(1,1) }}", &mut ctx), "1");
        assert_eq!(resolve("{{ random(1, 1) }}", &mut ctx), "1");
    }

    #[test]
    fn test_random_uses_context_source() {
        let mut ctx = context().with_random_source(SequenceSource::new([5]));
        assert_eq!(resolve("{{ random(1, 6) }}", &mut ctx), "5");
    }

    #[test]
    fn test_round_half_away_from_zero() {
        let mut ctx = context();
        assert_eq!(resolve("{{ round(3.7) }}", &mut ctx), "4");
        assert_eq!(resolve("{{ round(3.4) }}", &mut ctx), "3");
        assert_eq!(resolve("{{ round(2.5) }}", &mut ctx), "3");
        assert_eq!(resolve("{{ round(-2.5) }}", &mut ctx), "-3");
    }

    #[test]
    fn test_arguments() {
        let mut ctx = context().with_args(["10", "20"]);
        assert_eq!(resolve("{{ arguments.get(0) }}", &mut ctx), "10");
        assert_eq!(resolve("{{ arguments.get(1) }}", &mut ctx), "20");
        // out of range resolves to empty, never an error
        assert_eq!(resolve("{{ arguments.get(5) }}", &mut ctx), "");
    }

    #[test]
    fn test_unknown_passes_through() {
        let mut ctx = context();
        assert_eq!(
            resolve("{{ user.avatar }} and {{ user.name }}", &mut ctx),
            "{{ user.avatar }} and alice"
        );
    }

    #[test]
    fn test_no_unresolved_recognized_placeholder() {
        let mut ctx = context().with_args(["x"]);
        let resolved = resolve(
            "{{ user.name }} {{ server.name }} {{ random(2,2) }} {{ arguments.get(0) }}",
            &mut ctx,
        );
        assert!(!resolved.contains("{{"));
        assert_eq!(resolved, "alice Wonderland 2 x");
    }

    #[test]
    fn test_unterminated_marker_kept() {
        let mut ctx = context();
        assert_eq!(resolve("oops {{ user.name", &mut ctx), "oops {{ user.name");
    }

    #[test]
    fn test_check_balance() {
        assert!(check("{{ user.name }}").is_ok());
        assert!(check("no placeholders").is_ok());
        let warning = check("{{ user.name").unwrap_err();
        assert_eq!(warning.opening, 1);
        assert_eq!(warning.closing, 0);
    }

    #[test]
    fn test_unbalanced_still_resolves() {
        let mut ctx = context();
        assert_eq!(
            resolve("{{ user.name }} {{", &mut ctx),
            "alice {{"
        );
    }
}
