// src/exec/executor_loop.rs

//! Main executor loop that owns the running OS processes.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::{LaunchRequest, ProcessName, RuntimeEvent};
use crate::exec::process_runner::{spawn_process, supervise_child};
use crate::exec::tree::TreeKiller;
use crate::output::OutputSink;

/// Work items for the executor loop.
#[derive(Debug, Clone)]
pub enum ExecutorCommand {
    Launch(LaunchRequest),
    Terminate(Vec<ProcessName>),
}

/// Where and how processes are run.
#[derive(Debug, Clone)]
pub struct ExecutorOptions {
    /// Working directory of every launched process (the squid directory).
    pub cwd: PathBuf,
    /// Destination of the multiplexed output.
    pub sink: OutputSink,
}

/// Internal handle for the current OS process of one entry.
///
/// - `pid` is the process (and, on Unix, process group) id.
/// - `handle` is the Tokio task streaming output and awaiting the exit.
struct ActiveProcess {
    pid: Option<u32>,
    handle: tokio::task::JoinHandle<()>,
}

/// Spawn the background executor loop.
///
/// The returned sender is what `LocalProcessBackend` forwards the
/// supervisor's commands to. Commands are handled strictly in order, so a
/// termination sent after a launch always sees the launched process. **Per
/// process name there is never more than one OS process**: a relaunch
/// replaces the previous, already exited, handle.
pub fn spawn_executor(
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    options: ExecutorOptions,
    killer: Arc<dyn TreeKiller>,
) -> mpsc::Sender<ExecutorCommand> {
    let (tx, mut rx) = mpsc::channel::<ExecutorCommand>(32);

    tokio::spawn(async move {
        info!("executor loop started");

        let mut active: HashMap<ProcessName, ActiveProcess> = HashMap::new();

        while let Some(command) = rx.recv().await {
            match command {
                ExecutorCommand::Launch(request) => {
                    handle_launch(request, &mut active, &options, &runtime_tx).await;
                }
                ExecutorCommand::Terminate(names) => {
                    handle_terminate(&names, &active, killer.as_ref());
                }
            }
        }

        info!("executor loop finished (channel closed)");
    });

    tx
}

async fn handle_launch(
    request: LaunchRequest,
    active: &mut HashMap<ProcessName, ActiveProcess>,
    options: &ExecutorOptions,
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
) {
    let name = request.name().to_string();

    if let Some(existing) = active.get(&name) {
        if !existing.handle.is_finished() {
            warn!(
                process = %name,
                pid = ?existing.pid,
                "previous instance still being reaped while relaunching"
            );
        }
    }

    let child = match spawn_process(&request, &options.cwd) {
        Ok(child) => child,
        Err(e) => {
            let _ = runtime_tx
                .send(RuntimeEvent::SpawnFailed {
                    process: name,
                    error: e.to_string(),
                })
                .await;
            return;
        }
    };

    let pid = child.id();
    debug!(process = %name, ?pid, "process spawned");

    // Report the start before the waiter can report an exit.
    let _ = runtime_tx
        .send(RuntimeEvent::ProcessStarted {
            process: name.clone(),
            pid,
        })
        .await;

    let handle = tokio::spawn(supervise_child(
        child,
        request,
        options.sink.clone(),
        runtime_tx.clone(),
    ));

    active.insert(name, ActiveProcess { pid, handle });
}

fn handle_terminate(
    names: &[ProcessName],
    active: &HashMap<ProcessName, ActiveProcess>,
    killer: &dyn TreeKiller,
) {
    for name in names {
        let Some(process) = active.get(name) else {
            debug!(process = %name, "terminate requested for unknown process");
            continue;
        };

        if process.handle.is_finished() {
            debug!(process = %name, "process already exited; nothing to terminate");
            continue;
        }

        let Some(pid) = process.pid else {
            debug!(process = %name, "no pid recorded; cannot terminate");
            continue;
        };

        info!(process = %name, pid, "terminating process tree");
        if let Err(e) = killer.kill_tree(pid) {
            warn!(process = %name, pid, error = %e, "failed to terminate process tree");
        }
    }
}
