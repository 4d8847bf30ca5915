// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod env;
pub mod errors;
pub mod exec;
pub mod expr;
pub mod logging;
pub mod output;
pub mod plan;
pub mod selection;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ambient_with_env_file, load_manifest, process_env};
use crate::engine::{RestartPolicy, Runtime, RuntimeEvent, Supervisor};
use crate::exec::{ExecutorOptions, LocalProcessBackend};
use crate::output::OutputSink;
use crate::plan::{LaunchPlan, build_plan};
use crate::selection::Selection;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - manifest and env-file loading
/// - process selection and environment resolution
/// - supervisor / runtime
/// - local process backend and output multiplexing
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    // Everything that can fail on configuration happens before any spawn.
    let loaded = load_manifest(&args.path, &args.manifest)?;
    let selection = Selection::new(args.include.clone(), args.exclude.clone())?;
    let ambient = ambient_with_env_file(process_env(), &loaded.squid_dir, args.env_file.as_deref())?;

    let plan = build_plan(&loaded.manifest, &selection, ambient);

    if args.dry_run {
        print_dry_run(&plan, args.retries);
        return Ok(());
    }

    if plan.specs.is_empty() {
        info!(skipped = ?plan.skipped, "no processes selected; nothing to run");
        return Ok(());
    }

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let backend = LocalProcessBackend::new(
        rt_tx.clone(),
        ExecutorOptions {
            cwd: loaded.squid_dir.clone(),
            sink: OutputSink::stdout(),
        },
    );

    // Ctrl-C → terminate all process trees.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let policy = RestartPolicy {
        max_retries: args.retries,
    };
    let names: Vec<&str> = plan.specs.iter().map(|s| s.name.as_str()).collect();
    info!(processes = ?names, max_retries = policy.max_retries, "starting squid");

    let supervisor = Supervisor::new(plan.specs, policy);
    let runtime = Runtime::new(supervisor, rt_rx, backend);
    let finished = runtime.run().await?;

    for entry in finished.entries() {
        debug!(
            process = %entry.name(),
            state = ?entry.state(),
            restarts = entry.restart_count(),
            "final process state"
        );
    }

    Ok(())
}

/// Simple dry-run output: print processes, commands and resolved env keys.
fn print_dry_run(plan: &LaunchPlan, retries: u32) {
    println!("squidrun dry-run");
    println!("  retries = {retries}");
    println!();

    println!("processes ({}):", plan.specs.len());
    for spec in &plan.specs {
        println!("  - {}", spec.name);
        println!("      cmd: {:?}", spec.command);
        let keys: Vec<&str> = spec.env.keys().map(String::as_str).collect();
        println!("      env keys: {}", keys.len());
        debug!(process = %spec.name, ?keys, "resolved environment keys");
    }

    if !plan.skipped.is_empty() {
        println!("skipped: {:?}", plan.skipped);
    }

    if !plan.template_errors.is_empty() {
        println!("unresolved templates ({}):", plan.template_errors.len());
        for (scope, error) in &plan.template_errors {
            println!("  - {scope:?}: {error}");
        }
    }

    debug!("dry-run complete (no execution)");
}
