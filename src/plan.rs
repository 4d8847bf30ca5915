// src/plan.rs

//! Turns a manifest into the ordered list of processes to launch.

use tracing::{debug, warn};

use crate::config::Manifest;
use crate::engine::{LaunchSpec, ProcessName};
use crate::env::{EnvMap, EnvResolver};
use crate::expr::TemplateError;
use crate::selection::Selection;

/// Where a template error came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorScope {
    /// `deploy.env`, shared by every process.
    Shared,
    Process(ProcessName),
}

#[derive(Debug, Clone, Default)]
pub struct LaunchPlan {
    /// Selected processes, in manifest order (API first).
    pub specs: Vec<LaunchSpec>,
    /// Processes filtered out by the selection.
    pub skipped: Vec<ProcessName>,
    /// Template expressions that failed to parse and were kept verbatim.
    pub template_errors: Vec<(ErrorScope, TemplateError)>,
}

/// Select processes and resolve their environments against `ambient`.
///
/// Skipped processes are not resolved at all. Template errors are logged
/// and collected; they never fail the plan.
pub fn build_plan(manifest: &Manifest, selection: &Selection, ambient: EnvMap) -> LaunchPlan {
    let known: Vec<&str> = manifest.process_names().collect();
    for name in selection.unknown_names(&known) {
        warn!(process = %name, "selected process is not declared in the manifest");
    }

    let resolver = EnvResolver::new(ambient, &manifest.shared_env);
    let mut plan = LaunchPlan::default();

    for error in resolver.shared_errors() {
        warn!(scope = "deploy.env", %error, "template expression left unresolved");
        plan.template_errors.push((ErrorScope::Shared, error.clone()));
    }

    for process in &manifest.processes {
        if selection.is_skipped(&process.name) {
            debug!(process = %process.name, "skipping process");
            plan.skipped.push(process.name.clone());
            continue;
        }

        let resolved = resolver.resolve(&process.env);
        for error in resolved.errors {
            warn!(process = %process.name, %error, "template expression left unresolved");
            plan.template_errors
                .push((ErrorScope::Process(process.name.clone()), error));
        }

        plan.specs.push(LaunchSpec {
            name: process.name.clone(),
            command: process.command.clone(),
            env: resolved.vars,
        });
    }

    plan
}
