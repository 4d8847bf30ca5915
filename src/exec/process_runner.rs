// src/exec/process_runner.rs

//! Individual process spawning and supervision.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::engine::{LaunchRequest, RuntimeEvent, SIGNALED_EXIT_CODE};
use crate::errors::{Result, RunnerError};
use crate::output::{OutputSink, attach_stream};

/// How long stream readers may keep draining after the process exited.
///
/// Bounded because a detached helper can hold the pipes open indefinitely.
pub const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Build the OS command for a launch request.
///
/// The child gets exactly the resolved environment (the ambient layer is
/// already part of it), runs in `cwd`, and on Unix leads a new process
/// group so it can be terminated as a tree.
pub fn build_command(request: &LaunchRequest, cwd: &Path) -> Result<Command> {
    let spec = &request.spec;
    let Some((program, args)) = spec.command.split_first() else {
        return Err(RunnerError::SpawnError {
            name: request.name().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
        });
    };

    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(program).args(args);
        c
    } else {
        let mut c = Command::new(program);
        c.args(args);
        c
    };

    cmd.env_clear()
        .envs(&spec.env)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    #[cfg(unix)]
    cmd.process_group(0);

    Ok(cmd)
}

/// Spawn the process for `request`.
pub fn spawn_process(request: &LaunchRequest, cwd: &Path) -> Result<Child> {
    let mut cmd = build_command(request, cwd)?;

    info!(
        process = %request.name(),
        attempt = request.attempt,
        cmd = ?request.spec.command,
        "spawning process"
    );

    cmd.spawn()
        .map_err(|source| RunnerError::SpawnError {
            name: request.name().to_string(),
            source,
        })
}

/// Stream the child's output into `sink`, wait for it to exit and report
/// the exit to the runtime.
pub async fn supervise_child(
    mut child: Child,
    request: LaunchRequest,
    sink: OutputSink,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) {
    let name = request.name().to_string();

    let mut readers = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        readers.push(attach_stream(sink.clone(), request.label.clone(), stdout));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(attach_stream(sink, request.label.clone(), stderr));
    }

    let code = match child.wait().await {
        Ok(status) => status.code().unwrap_or(SIGNALED_EXIT_CODE),
        Err(e) => {
            error!(process = %name, error = %e, "waiting for process failed");
            SIGNALED_EXIT_CODE
        }
    };

    let drained = tokio::time::timeout(DRAIN_GRACE, async {
        for reader in readers {
            let _ = reader.await;
        }
    })
    .await;
    if drained.is_err() {
        debug!(process = %name, "output still open after exit; not waiting further");
    }

    if runtime_tx
        .send(RuntimeEvent::ProcessExited {
            process: name.clone(),
            code,
        })
        .await
        .is_err()
    {
        debug!(process = %name, "runtime gone; exit not reported");
    }
}
