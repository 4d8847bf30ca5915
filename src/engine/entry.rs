// src/engine/entry.rs

//! Per-process supervision state.

use std::sync::Arc;

use crate::engine::{LaunchRequest, LaunchSpec, ProcessName};
use crate::output::{Color, Label};

/// Lifecycle of one managed process.
///
/// `Starting → Running → Exited(code)`, after which the supervisor moves the
/// entry to `Stopped`, `Killed`, or back to `Starting` for a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Launch requested, spawn not yet confirmed.
    Starting,
    Running,
    /// Transient: exit observed, restart decision pending.
    Exited(i32),
    /// Exited with code 0. Terminal.
    Stopped,
    /// Retry budget exhausted, terminated by a cascade, or failed to spawn.
    /// Terminal.
    Killed,
}

impl ProcessState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ProcessState::Stopped | ProcessState::Killed)
    }

    /// Whether an OS process may currently exist for this entry.
    pub fn is_live(self) -> bool {
        matches!(self, ProcessState::Starting | ProcessState::Running)
    }
}

/// Supervisor-side record of one process.
///
/// The OS handle itself belongs to the executor; this tracks what the
/// supervisor needs to decide about restarts.
#[derive(Debug, Clone)]
pub struct ProcessEntry {
    spec: Arc<LaunchSpec>,
    color: Color,
    state: ProcessState,
    restart_count: u32,
    launches: u32,
    pid: Option<u32>,
}

impl ProcessEntry {
    pub fn new(spec: LaunchSpec, color: Color) -> Self {
        Self {
            spec: Arc::new(spec),
            color,
            state: ProcessState::Starting,
            restart_count: 0,
            launches: 0,
            pid: None,
        }
    }

    pub fn name(&self) -> &ProcessName {
        &self.spec.name
    }

    pub fn spec(&self) -> &LaunchSpec {
        &self.spec
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn restart_count(&self) -> u32 {
        self.restart_count
    }

    /// Total number of launch requests issued for this entry.
    pub fn launches(&self) -> u32 {
        self.launches
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub(crate) fn set_state(&mut self, state: ProcessState) {
        self.state = state;
    }

    pub(crate) fn mark_running(&mut self, pid: Option<u32>) {
        self.state = ProcessState::Running;
        self.pid = pid;
    }

    pub(crate) fn mark_exited(&mut self, code: i32) {
        self.state = ProcessState::Exited(code);
        self.pid = None;
    }

    /// Pin the counter at the budget so no further restart is possible.
    pub(crate) fn exhaust(&mut self, max_retries: u32) {
        self.restart_count = max_retries;
    }

    pub(crate) fn bump_restart(&mut self) {
        self.restart_count += 1;
    }

    /// Move to `Starting` and produce the request for the executor.
    pub(crate) fn launch(&mut self) -> LaunchRequest {
        self.state = ProcessState::Starting;
        self.launches += 1;
        LaunchRequest {
            spec: Arc::clone(&self.spec),
            label: Label::new(self.spec.name.clone(), self.color),
            attempt: self.restart_count,
        }
    }
}
