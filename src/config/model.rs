// src/config/model.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

/// Name under which the API process of a squid always runs.
pub const API_PROCESS_NAME: &str = "api";

/// Manifest exactly as read from YAML, before validation.
///
/// ```yaml
/// manifest_version: subsquid.io/v0.1
/// name: my-squid
/// version: 1
/// deploy:
///   env:
///     RPC_ENDPOINT: ${{ secrets.RPC_ENDPOINT }}
///   api:
///     cmd: ["npx", "squid-graphql-server"]
///   processor:
///     - name: eth-processor
///       cmd: ["node", "lib/main.js"]
/// ```
///
/// Fields the runner does not use (build steps, scaling, ...) are ignored.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawManifest {
    #[serde(default)]
    pub manifest_version: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub version: Option<serde_yaml::Value>,

    #[serde(default)]
    pub deploy: Option<DeploySection>,
}

/// `deploy:` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DeploySection {
    /// Environment shared by every process of the squid.
    #[serde(default, deserialize_with = "deserialize_env")]
    pub env: BTreeMap<String, String>,

    #[serde(default)]
    pub api: Option<ApiSection>,

    /// Either a single processor mapping or a list of them.
    #[serde(default)]
    pub processor: Option<OneOrMany<ProcessorSection>>,
}

/// `deploy.api`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSection {
    pub cmd: Vec<String>,

    #[serde(default, deserialize_with = "deserialize_env")]
    pub env: BTreeMap<String, String>,
}

/// One entry of `deploy.processor`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessorSection {
    pub name: String,

    pub cmd: Vec<String>,

    #[serde(default, deserialize_with = "deserialize_env")]
    pub env: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

/// A process as declared in the manifest. `env` values are still templated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    pub name: String,
    pub command: Vec<String>,
    pub env: BTreeMap<String, String>,
}

/// Validated manifest. Construct through `Manifest::try_from(RawManifest)`.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub name: Option<String>,
    /// Environment shared by every process (templated).
    pub shared_env: BTreeMap<String, String>,
    /// API process first (if any), then processors in declaration order.
    pub processes: Vec<ProcessSpec>,
}

impl Manifest {
    pub(crate) fn new_unchecked(
        name: Option<String>,
        shared_env: BTreeMap<String, String>,
        processes: Vec<ProcessSpec>,
    ) -> Self {
        Self {
            name,
            shared_env,
            processes,
        }
    }

    pub fn process(&self, name: &str) -> Option<&ProcessSpec> {
        self.processes.iter().find(|p| p.name == name)
    }

    pub fn process_names(&self) -> impl Iterator<Item = &str> {
        self.processes.iter().map(|p| p.name.as_str())
    }
}

/// Environment values may be written as YAML scalars of any type
/// (`PORT: 4350`, `DEBUG: true`); they are all passed on as strings.
fn deserialize_env<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let raw: Option<BTreeMap<String, Value>> = Option::deserialize(deserializer)?;
    raw.unwrap_or_default()
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s,
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::Null => String::new(),
                other => {
                    return Err(D::Error::custom(format!(
                        "env value for '{key}' must be a scalar, got {other:?}"
                    )));
                }
            };
            Ok((key, value))
        })
        .collect()
}
