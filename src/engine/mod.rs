// src/engine/mod.rs

//! Supervision engine for squidrun.
//!
//! This module ties together:
//! - the per-process state machine and restart counters ([`entry`])
//! - the restart / cascade decisions ([`event_handlers`])
//! - the main runtime event loop that reacts to:
//!   - process start and spawn-failure reports
//!   - process exit events
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::output::Label;

/// Canonical process name type used throughout the engine.
pub type ProcessName = String;

/// Default retry budget per process.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Exit code reported for processes that were terminated by a signal.
pub const SIGNALED_EXIT_CODE: i32 = -1;

/// A process ready to be launched: name, argv and fully resolved env.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub name: ProcessName,
    pub command: Vec<String>,
    pub env: BTreeMap<String, String>,
}

/// How often a failing process is relaunched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartPolicy {
    pub max_retries: u32,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// Instruction to the executor to start one process instance.
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    pub spec: Arc<LaunchSpec>,
    pub label: Label,
    /// 0 for the first launch, `n` for the n-th restart.
    pub attempt: u32,
}

impl LaunchRequest {
    pub fn name(&self) -> &str {
        &self.spec.name
    }
}

/// Events flowing into the runtime from the executor and signal handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// The OS process for `process` was spawned.
    ProcessStarted {
        process: ProcessName,
        pid: Option<u32>,
    },
    /// The OS refused to start `process`.
    SpawnFailed {
        process: ProcessName,
        error: String,
    },
    /// The current instance of `process` exited.
    ProcessExited {
        process: ProcessName,
        code: i32,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod entry;
pub mod event_handlers;
pub mod runtime;

pub use core::Supervisor;
pub use entry::{ProcessEntry, ProcessState};
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::Runtime;
