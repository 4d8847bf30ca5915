// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{Manifest, RawManifest};
use crate::env::EnvMap;
use crate::errors::{Result, RunnerError};

/// Manifest file name used when `--manifest` is not given.
pub const DEFAULT_MANIFEST: &str = "squid.yaml";

/// Environment file name used when `--env-file` is not given.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// A validated manifest together with the directory processes run in.
#[derive(Debug, Clone)]
pub struct LoadedManifest {
    pub squid_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub manifest: Manifest,
}

/// Load a manifest file from a given path and return the raw `RawManifest`.
///
/// This only performs YAML deserialization; it does **not** perform semantic
/// validation. Use [`load_manifest`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawManifest> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        RunnerError::ConfigError(format!("reading manifest at {}: {e}", path.display()))
    })?;

    let manifest: RawManifest = serde_yaml::from_str(&contents)?;

    Ok(manifest)
}

/// Resolve the squid directory, then load and validate the manifest in it.
///
/// `manifest_path` is taken relative to `source` unless it is absolute.
pub fn load_manifest(source: impl AsRef<Path>, manifest_path: impl AsRef<Path>) -> Result<LoadedManifest> {
    let source = source.as_ref();
    let squid_dir = std::path::absolute(source)?;
    if !squid_dir.is_dir() {
        return Err(RunnerError::ConfigError(format!(
            "squid source {} is not a directory",
            squid_dir.display()
        )));
    }

    let manifest_path = resolve_in(&squid_dir, manifest_path.as_ref());
    debug!(path = %manifest_path.display(), "loading manifest");

    let raw = load_from_path(&manifest_path)?;
    let manifest = Manifest::try_from(raw)?;

    Ok(LoadedManifest {
        squid_dir,
        manifest_path,
        manifest,
    })
}

/// Parse a dotenv-style file into a map.
pub fn load_env_file(path: impl AsRef<Path>) -> Result<EnvMap> {
    let mut vars = EnvMap::new();
    for item in dotenvy::from_path_iter(path.as_ref())? {
        let (key, value) = item?;
        vars.insert(key, value);
    }
    Ok(vars)
}

/// Add `file_vars` to `ambient` without overriding variables already set.
pub fn merge_env_file(ambient: &mut EnvMap, file_vars: EnvMap) {
    for (key, value) in file_vars {
        ambient.entry(key).or_insert(value);
    }
}

/// Join `path` onto `base` unless it is already absolute.
pub fn resolve_in(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Snapshot of the current process environment.
///
/// Variables whose name or value is not valid UTF-8 are skipped.
pub fn process_env() -> EnvMap {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

/// Apply the supplemental env file to the `base` snapshot.
///
/// With `env_file = None` the default `.env` in `squid_dir` is used if it
/// exists. An explicitly requested file must exist and parse.
pub fn ambient_with_env_file(base: EnvMap, squid_dir: &Path, env_file: Option<&str>) -> Result<EnvMap> {
    let mut ambient = base;

    let path = match env_file {
        Some(file) => resolve_in(squid_dir, Path::new(file)),
        None => {
            let path = squid_dir.join(DEFAULT_ENV_FILE);
            if !path.is_file() {
                debug!(path = %path.display(), "no default env file; skipping");
                return Ok(ambient);
            }
            path
        }
    };

    debug!(path = %path.display(), "loading env file");
    let vars = load_env_file(&path)?;
    merge_env_file(&mut ambient, vars);
    Ok(ambient)
}
