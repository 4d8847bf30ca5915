// src/engine/core.rs

//! Pure core supervisor state machine.
//!
//! This module contains a synchronous, deterministic supervisor that
//! consumes [`RuntimeEvent`]s and produces:
//! - updated per-process state and restart counters
//! - a list of commands describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from channels
//! - handing launches and terminations to the process backend
//! - handling Ctrl+C / shutdown
//!
//! A shutdown, like a cascade, only ends the run once every terminated
//! process has reported its exit.
//!
//! Because every event goes through [`Supervisor::step`] one at a time, the
//! supervisor is the only writer of restart counters and a cascade happens
//! inside a single step.

use crate::engine::entry::ProcessEntry;
use crate::engine::event_handlers::{
    CoreStep, handle_process_exit, handle_process_started, handle_shutdown, handle_spawn_failed,
    handle_start,
};
use crate::engine::{LaunchSpec, ProcessName, RestartPolicy, RuntimeEvent};
use crate::output::Color;

#[derive(Debug)]
pub struct Supervisor {
    entries: Vec<ProcessEntry>,
    policy: RestartPolicy,
    /// Process whose exhausted budget triggered the cascade, if any.
    cascade: Option<ProcessName>,
    /// Set once an operator shutdown was requested.
    shutting_down: bool,
}

impl Supervisor {
    /// Create entries for `specs`, which must already be filtered and in
    /// start order. Colors follow that order.
    pub fn new(specs: Vec<LaunchSpec>, policy: RestartPolicy) -> Self {
        let entries = specs
            .into_iter()
            .enumerate()
            .map(|(i, spec)| ProcessEntry::new(spec, Color::for_index(i)))
            .collect();

        Self {
            entries,
            policy,
            cascade: None,
            shutting_down: false,
        }
    }

    pub fn policy(&self) -> RestartPolicy {
        self.policy
    }

    pub fn entries(&self) -> &[ProcessEntry] {
        &self.entries
    }

    pub fn entry(&self, name: &str) -> Option<&ProcessEntry> {
        self.entries.iter().find(|e| e.name() == name)
    }

    pub fn cascade_origin(&self) -> Option<&str> {
        self.cascade.as_deref()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down
    }

    /// Whether every entry reached `Stopped` or `Killed`.
    pub fn is_finished(&self) -> bool {
        self.entries.iter().all(|e| e.state().is_terminal())
    }

    /// Launch every entry. Call once, before feeding events.
    pub fn start(&mut self) -> CoreStep {
        handle_start(&mut self.entries)
    }

    /// Handle a single runtime event, updating state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::ProcessStarted { process, pid } => {
                handle_process_started(&mut self.entries, &process, pid)
            }
            RuntimeEvent::SpawnFailed { process, error } => {
                handle_spawn_failed(&mut self.entries, &process, &error)
            }
            RuntimeEvent::ProcessExited { process, code } => handle_process_exit(
                &mut self.entries,
                &self.policy,
                &mut self.cascade,
                self.shutting_down,
                &process,
                code,
            ),
            RuntimeEvent::ShutdownRequested => {
                self.shutting_down = true;
                handle_shutdown(&mut self.entries, &self.policy)
            }
        }
    }
}
