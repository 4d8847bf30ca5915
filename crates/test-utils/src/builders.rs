#![allow(dead_code)]

use std::collections::BTreeMap;

use squidrun::config::{
    ApiSection, DeploySection, Manifest, OneOrMany, ProcessorSection, RawManifest,
};
use squidrun::engine::LaunchSpec;

/// Builder for `Manifest` to simplify test setup.
pub struct ManifestBuilder {
    manifest: RawManifest,
    processors: Vec<ProcessorSection>,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self {
            manifest: RawManifest {
                manifest_version: Some("subsquid.io/v0.1".to_string()),
                name: Some("test-squid".to_string()),
                version: None,
                deploy: Some(DeploySection::default()),
            },
            processors: Vec::new(),
        }
    }

    fn deploy(&mut self) -> &mut DeploySection {
        self.manifest.deploy.get_or_insert_with(DeploySection::default)
    }

    pub fn with_shared_env(mut self, key: &str, value: &str) -> Self {
        self.deploy().env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_api(mut self, cmd: &[&str], env: &[(&str, &str)]) -> Self {
        self.deploy().api = Some(ApiSection {
            cmd: to_strings(cmd),
            env: to_map(env),
        });
        self
    }

    pub fn with_processor(mut self, name: &str, cmd: &[&str], env: &[(&str, &str)]) -> Self {
        self.processors.push(ProcessorSection {
            name: name.to_string(),
            cmd: to_strings(cmd),
            env: to_map(env),
        });
        self
    }

    pub fn raw(mut self) -> RawManifest {
        let processors = std::mem::take(&mut self.processors);
        if !processors.is_empty() {
            self.deploy().processor = Some(OneOrMany::Many(processors));
        }
        self.manifest
    }

    pub fn build(self) -> Manifest {
        Manifest::try_from(self.raw()).expect("Failed to build valid manifest from builder")
    }
}

impl Default for ManifestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `LaunchSpec`.
pub struct LaunchSpecBuilder {
    spec: LaunchSpec,
}

impl LaunchSpecBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            spec: LaunchSpec {
                name: name.to_string(),
                command: vec!["true".to_string()],
                env: BTreeMap::new(),
            },
        }
    }

    pub fn command(mut self, cmd: &[&str]) -> Self {
        self.spec.command = to_strings(cmd);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.spec.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn build(self) -> LaunchSpec {
        self.spec
    }
}

/// Launch specs with default commands for each name, in order.
pub fn specs(names: &[&str]) -> Vec<LaunchSpec> {
    names.iter().map(|n| LaunchSpecBuilder::new(n).build()).collect()
}

/// Build a string map from pairs.
pub fn env_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    to_map(pairs)
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn to_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
