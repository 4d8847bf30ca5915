// src/env/mod.rs

//! Environment resolution for launched processes.
//!
//! Every process gets its environment built from three layers, lowest to
//! highest precedence:
//!
//! 1. the ambient environment, minus [`RESERVED_PORT_VAR`],
//! 2. the manifest's shared `deploy.env`,
//! 3. the process's own `env`.
//!
//! Layers 2 and 3 are template-substituted against the secrets context
//! first. [`FORCED_VARS`] are applied last and always win.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::expr::{TemplateError, substitute};

/// Port reservation of the runner itself; must never leak into children.
pub const RESERVED_PORT_VAR: &str = "PROCESSOR_PROMETHEUS_PORT";

/// Variables forcing colorized, pretty logging in children.
pub const FORCED_VARS: [(&str, &str); 2] =
    [("FORCE_COLOR", "true"), ("FORCE_PRETTY_LOGGER", "true")];

pub type EnvMap = BTreeMap<String, String>;

/// Read-only snapshot available to template expressions.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentContext {
    secrets: EnvMap,
}

impl EnvironmentContext {
    pub fn new(secrets: EnvMap) -> Self {
        Self { secrets }
    }

    pub fn secrets(&self) -> &EnvMap {
        &self.secrets
    }

    /// Expression evaluation view: `{"secrets": {...}}`.
    pub fn to_value(&self) -> Value {
        let secrets: Map<String, Value> = self
            .secrets
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();

        let mut root = Map::new();
        root.insert("secrets".to_string(), Value::Object(secrets));
        Value::Object(root)
    }
}

/// Fully merged environment of one process plus any template failures.
#[derive(Debug, Clone, Default)]
pub struct ResolvedEnv {
    pub vars: EnvMap,
    pub errors: Vec<TemplateError>,
}

/// Substitute templates in every value of `env`.
pub fn eval_env(env: &EnvMap, context: &Value, errors: &mut Vec<TemplateError>) -> EnvMap {
    env.iter()
        .map(|(key, raw)| {
            let sub = substitute(raw, context);
            errors.extend(sub.errors);
            (key.clone(), sub.value)
        })
        .collect()
}

/// Resolves per-process environments against one ambient snapshot.
///
/// The shared layer is substituted once, at construction; its template
/// failures are available through [`EnvResolver::shared_errors`].
#[derive(Debug, Clone)]
pub struct EnvResolver {
    ambient: EnvMap,
    context: Value,
    shared: EnvMap,
    shared_errors: Vec<TemplateError>,
}

impl EnvResolver {
    /// `ambient` doubles as the secrets context.
    pub fn new(ambient: EnvMap, shared: &EnvMap) -> Self {
        let context = EnvironmentContext::new(ambient.clone()).to_value();
        let mut shared_errors = Vec::new();
        let shared = eval_env(shared, &context, &mut shared_errors);
        Self {
            ambient,
            context,
            shared,
            shared_errors,
        }
    }

    pub fn ambient(&self) -> &EnvMap {
        &self.ambient
    }

    pub fn shared_errors(&self) -> &[TemplateError] {
        &self.shared_errors
    }

    /// Merge the layers for one process; `errors` only covers `own`.
    pub fn resolve(&self, own: &EnvMap) -> ResolvedEnv {
        let mut errors = Vec::new();

        let mut vars: EnvMap = self
            .ambient
            .iter()
            .filter(|(k, _)| k.as_str() != RESERVED_PORT_VAR)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        vars.extend(self.shared.iter().map(|(k, v)| (k.clone(), v.clone())));
        vars.extend(eval_env(own, &self.context, &mut errors));

        for (key, value) in FORCED_VARS {
            vars.insert(key.to_string(), value.to_string());
        }

        ResolvedEnv { vars, errors }
    }
}
