// src/selection.rs

//! Include / exclude filtering of manifest processes.

use crate::errors::{Result, RunnerError};

/// Which processes of a manifest to run.
///
/// `include` and `exclude` are mutually exclusive; an empty selection runs
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl Selection {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Result<Self> {
        if !include.is_empty() && !exclude.is_empty() {
            return Err(RunnerError::ConfigError(
                "--include and --exclude cannot be used together".to_string(),
            ));
        }
        Ok(Self { include, exclude })
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn include(names: &[&str]) -> Self {
        Self {
            include: names.iter().map(|s| s.to_string()).collect(),
            exclude: Vec::new(),
        }
    }

    pub fn exclude(names: &[&str]) -> Self {
        Self {
            include: Vec::new(),
            exclude: names.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn is_skipped(&self, name: &str) -> bool {
        if !self.exclude.is_empty() && self.exclude.iter().any(|n| n == name) {
            return true;
        }
        !self.include.is_empty() && !self.include.iter().any(|n| n == name)
    }

    /// Selected names that do not exist in `known`, for operator warnings.
    pub fn unknown_names<'a>(&'a self, known: &[&str]) -> Vec<&'a str> {
        self.include
            .iter()
            .chain(self.exclude.iter())
            .map(String::as_str)
            .filter(|n| !known.contains(n))
            .collect()
    }
}
