// src/exec/tree.rs

//! Process-tree termination.
//!
//! A launched command may fork helpers of its own, so killing only the
//! direct child would leave orphans behind. On Unix every process is started
//! as the leader of a new process group and the whole group is sent
//! `SIGKILL`; on Windows `taskkill /T /F` walks the tree.

use std::io;

/// Forcefully terminates a process and all of its descendants.
pub trait TreeKiller: Send + Sync {
    fn kill_tree(&self, pid: u32) -> io::Result<()>;
}

/// Platform implementation used in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTreeKiller;

#[cfg(unix)]
impl TreeKiller for SystemTreeKiller {
    fn kill_tree(&self, pid: u32) -> io::Result<()> {
        use nix::errno::Errno;
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        let pgid = i32::try_from(pid)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))?;

        match killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
            Ok(()) => Ok(()),
            // Group already gone.
            Err(Errno::ESRCH) => Ok(()),
            Err(e) => Err(io::Error::from(e)),
        }
    }
}

#[cfg(windows)]
impl TreeKiller for SystemTreeKiller {
    fn kill_tree(&self, pid: u32) -> io::Result<()> {
        let status = std::process::Command::new("taskkill")
            .args(["/PID", &pid.to_string(), "/T", "/F"])
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()?;

        if status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!(
                "taskkill exited with {status} for pid {pid}"
            )))
        }
    }
}
