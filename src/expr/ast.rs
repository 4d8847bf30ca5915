// src/expr/ast.rs

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::warn;

/// Parsed template expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// A bare name, looked up as a key of the current context.
    Identifier(String),
    /// `object.member`: `member` is evaluated with the value of `object`
    /// as its context.
    MemberAccess {
        object: Box<Expression>,
        member: Box<Expression>,
    },
}

impl Expression {
    pub fn member(object: Expression, member: Expression) -> Self {
        Expression::MemberAccess {
            object: Box::new(object),
            member: Box::new(member),
        }
    }

    /// Evaluate against `context`.
    ///
    /// A missing key, or a non-object value somewhere along the path,
    /// yields `None` rather than an error.
    pub fn eval<'a>(&self, context: &'a Value) -> Option<&'a Value> {
        match self {
            Expression::Identifier(name) => context.as_object()?.get(name),
            Expression::MemberAccess { object, member } => {
                let scope = object.eval(context)?;
                member.eval(scope)
            }
        }
    }

    /// Evaluate and render as the text substituted into a template.
    ///
    /// Missing values, `null`, objects and arrays render as the empty
    /// string, so `${{ secrets }}` exposes nothing.
    pub fn render(&self, context: &Value) -> String {
        match self.eval(context) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Object(_) | Value::Array(_)) => {
                warn!("expression resolves to an object or array; substituting an empty string");
                String::new()
            }
            Some(other) => other.to_string(),
        }
    }

    /// Root-level identifiers this expression reads under `path`.
    ///
    /// With an empty path this is the set of context roots the expression
    /// depends on (`secrets.A` → `{secrets}`). With `["secrets"]` it is the
    /// set of names read inside `secrets` (`secrets.A` → `{A}`).
    pub fn variables(&self, path: &[&str]) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        match self {
            Expression::Identifier(name) => {
                if path.is_empty() {
                    out.insert(name.clone());
                }
            }
            Expression::MemberAccess { object, member } => {
                let Some(root) = object.variables(&[]).into_iter().next() else {
                    return out;
                };
                match path.split_first() {
                    None => {
                        out.insert(root);
                    }
                    Some((head, rest)) if *head == root => {
                        out.extend(member.variables(rest));
                    }
                    Some(_) => {}
                }
            }
        }
        out
    }
}
