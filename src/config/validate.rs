// src/config/validate.rs

use std::collections::HashSet;

use crate::config::model::{API_PROCESS_NAME, Manifest, ProcessSpec, RawManifest};
use crate::errors::{Result, RunnerError};

impl TryFrom<RawManifest> for Manifest {
    type Error = crate::errors::RunnerError;

    fn try_from(raw: RawManifest) -> std::result::Result<Self, Self::Error> {
        let deploy = raw.deploy.unwrap_or_default();
        let mut processes = Vec::new();

        if let Some(api) = deploy.api {
            processes.push(ProcessSpec {
                name: API_PROCESS_NAME.to_string(),
                command: api.cmd,
                env: api.env,
            });
        }

        if let Some(processors) = deploy.processor {
            processes.extend(processors.into_vec().into_iter().map(|p| ProcessSpec {
                name: p.name,
                command: p.cmd,
                env: p.env,
            }));
        }

        validate_processes(&processes)?;
        Ok(Manifest::new_unchecked(raw.name, deploy.env, processes))
    }
}

fn validate_processes(processes: &[ProcessSpec]) -> Result<()> {
    ensure_has_processes(processes)?;
    validate_names(processes)?;
    validate_commands(processes)?;
    Ok(())
}

fn ensure_has_processes(processes: &[ProcessSpec]) -> Result<()> {
    if processes.is_empty() {
        return Err(RunnerError::ConfigError(
            "manifest must declare deploy.api or at least one deploy.processor".to_string(),
        ));
    }
    Ok(())
}

fn validate_names(processes: &[ProcessSpec]) -> Result<()> {
    let mut seen = HashSet::new();
    for process in processes {
        if process.name.trim().is_empty() {
            return Err(RunnerError::ConfigError(
                "processor name must not be empty".to_string(),
            ));
        }
        if !seen.insert(process.name.as_str()) {
            return Err(RunnerError::ConfigError(format!(
                "duplicate process name '{}'",
                process.name
            )));
        }
    }
    Ok(())
}

fn validate_commands(processes: &[ProcessSpec]) -> Result<()> {
    for process in processes {
        match process.command.first() {
            Some(program) if !program.trim().is_empty() => {}
            _ => {
                return Err(RunnerError::ConfigError(format!(
                    "process '{}' has an empty `cmd`",
                    process.name
                )));
            }
        }
    }
    Ok(())
}
