// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Manifest parsing error: {0}")]
    ManifestError(#[from] serde_yaml::Error),

    #[error("Environment file error: {0}")]
    EnvFileError(#[from] dotenvy::Error),

    #[error("Failed to start process '{name}': {source}")]
    SpawnError {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, RunnerError>;
