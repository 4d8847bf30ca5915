// src/engine/event_handlers.rs

//! Event handling logic for the core supervisor.

use tracing::{debug, error, info, warn};

use crate::engine::entry::{ProcessEntry, ProcessState};
use crate::engine::{LaunchRequest, ProcessName, RestartPolicy};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone)]
pub enum CoreCommand {
    /// Start (or restart) one process.
    Launch(LaunchRequest),
    /// Forcefully terminate the whole process tree of each named process.
    TerminateTrees(Vec<ProcessName>),
    /// Every entry is terminal; the run is over.
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute, in order.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    /// Commands ready to hand out; the run-over check has not been applied.
    fn continuing(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Launch every entry in order.
pub fn handle_start(entries: &mut [ProcessEntry]) -> CoreStep {
    let mut commands = Vec::with_capacity(entries.len());
    for entry in entries.iter_mut() {
        info!(process = %entry.name(), "starting process");
        commands.push(CoreCommand::Launch(entry.launch()));
    }
    finish(entries, commands)
}

/// Handle confirmation that an OS process was spawned.
pub fn handle_process_started(
    entries: &mut [ProcessEntry],
    process: &str,
    pid: Option<u32>,
) -> CoreStep {
    let Some(entry) = find(entries, process) else {
        return CoreStep::continuing(Vec::new());
    };

    if entry.state() == ProcessState::Starting {
        debug!(process, ?pid, "process running");
        entry.mark_running(pid);
    } else {
        debug!(process, state = ?entry.state(), "ignoring start report for inactive entry");
    }

    CoreStep::continuing(Vec::new())
}

/// Handle a spawn failure: the entry is terminal, the rest keep running.
pub fn handle_spawn_failed(entries: &mut [ProcessEntry], process: &str, reason: &str) -> CoreStep {
    if let Some(entry) = find(entries, process) {
        if entry.state().is_live() {
            error!(process, error = %reason, "failed to start process");
            entry.set_state(ProcessState::Killed);
        }
    }
    finish(entries, Vec::new())
}

/// Handle an exit event and apply the restart policy.
///
/// - exit code 0 → `Stopped`
/// - failure with budget left → relaunch, `restart_count += 1`
/// - failure with budget exhausted → `Killed`, and the first such entry
///   triggers the cascade over every other live entry, unless a shutdown
///   is already tearing everything down.
pub fn handle_process_exit(
    entries: &mut [ProcessEntry],
    policy: &RestartPolicy,
    cascade: &mut Option<ProcessName>,
    shutting_down: bool,
    process: &str,
    code: i32,
) -> CoreStep {
    let Some(idx) = entries.iter().position(|e| e.name() == process) else {
        warn!(process, "exit event for unknown process");
        return CoreStep::continuing(Vec::new());
    };

    let mut commands = Vec::new();
    let entry = &mut entries[idx];

    if !entry.state().is_live() {
        debug!(process, state = ?entry.state(), "ignoring stale exit event");
        return finish(entries, commands);
    }

    entry.mark_exited(code);
    info!(process, exit_code = code, "process exited");

    if code == 0 {
        entry.set_state(ProcessState::Stopped);
    } else if entry.restart_count() < policy.max_retries {
        entry.bump_restart();
        info!(
            process,
            attempt = entry.restart_count(),
            max_retries = policy.max_retries,
            "restarting process"
        );
        commands.push(CoreCommand::Launch(entry.launch()));
    } else {
        entry.set_state(ProcessState::Killed);
        if shutting_down {
            debug!(process, "process terminated by shutdown");
        } else if cascade.is_none() {
            warn!(
                process,
                max_retries = policy.max_retries,
                "retry budget exhausted; terminating all processes"
            );
            *cascade = Some(process.to_string());
            let victims = cascade_from(entries, idx, policy);
            if !victims.is_empty() {
                commands.push(CoreCommand::TerminateTrees(victims));
            }
        } else {
            debug!(process, "process killed during cascade");
        }
    }

    finish(entries, commands)
}

/// Handle an operator shutdown: pin every live counter at the budget and
/// terminate every live process tree.
///
/// The run keeps going until each terminated process has reported its
/// exit, so no tree is left behind when the caller returns.
pub fn handle_shutdown(entries: &mut [ProcessEntry], policy: &RestartPolicy) -> CoreStep {
    let mut victims = Vec::new();
    for entry in entries.iter_mut().filter(|e| e.state().is_live()) {
        entry.exhaust(policy.max_retries);
        victims.push(entry.name().clone());
    }

    info!(?victims, "shutdown requested; terminating running processes");

    let mut commands = Vec::new();
    if !victims.is_empty() {
        commands.push(CoreCommand::TerminateTrees(victims));
    }
    finish(entries, commands)
}

/// Pin every other live entry at the budget and list them for termination.
///
/// Entries that are already `Stopped` or `Killed` are left alone.
fn cascade_from(
    entries: &mut [ProcessEntry],
    origin: usize,
    policy: &RestartPolicy,
) -> Vec<ProcessName> {
    entries
        .iter_mut()
        .enumerate()
        .filter(|(i, e)| *i != origin && e.state().is_live())
        .map(|(_, e)| {
            e.exhaust(policy.max_retries);
            e.name().clone()
        })
        .collect()
}

/// Append `RequestExit` and stop the loop once every entry is terminal.
fn finish(entries: &[ProcessEntry], mut commands: Vec<CoreCommand>) -> CoreStep {
    if entries.iter().all(|e| e.state().is_terminal()) {
        info!("all processes finished");
        commands.push(CoreCommand::RequestExit);
        return CoreStep {
            commands,
            keep_running: false,
        };
    }
    CoreStep::continuing(commands)
}

fn find<'a>(entries: &'a mut [ProcessEntry], process: &str) -> Option<&'a mut ProcessEntry> {
    let entry = entries.iter_mut().find(|e| e.name() == process);
    if entry.is_none() {
        warn!(process, "event for unknown process");
    }
    entry
}
