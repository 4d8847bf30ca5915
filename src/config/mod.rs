// src/config/mod.rs

//! Manifest and environment-file loading.
//!
//! Responsibilities:
//! - Define the YAML-backed manifest data model (`model.rs`).
//! - Load a manifest and an optional `.env` file from disk (`loader.rs`).
//! - Validate basic invariants like unique process names (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{
    DEFAULT_ENV_FILE, DEFAULT_MANIFEST, LoadedManifest, ambient_with_env_file, load_env_file,
    load_from_path, load_manifest, merge_env_file, process_env,
};
pub use model::{
    API_PROCESS_NAME, ApiSection, DeploySection, Manifest, OneOrMany, ProcessSpec,
    ProcessorSection, RawManifest,
};
