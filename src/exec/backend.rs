// src/exec/backend.rs

//! Pluggable process backend abstraction.
//!
//! The runtime talks to a `ProcessBackend` instead of raw channels. This
//! makes it easy to swap in a scripted backend in tests while keeping the
//! production executor in [`executor_loop`](super::executor_loop).
//!
//! - `LocalProcessBackend` is the default implementation used by
//!   `squidrun`. It wraps the executor loop and forwards commands to it.
//! - Tests can provide their own `ProcessBackend` that, for example, records
//!   launches and directly emits exit events.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::engine::{LaunchRequest, ProcessName, RuntimeEvent};
use crate::errors::{Error, Result};

use super::executor_loop::{ExecutorCommand, ExecutorOptions, spawn_executor};
use super::tree::{SystemTreeKiller, TreeKiller};

/// Trait abstracting how supervised processes are started and stopped.
///
/// Production code uses [`LocalProcessBackend`]; tests can provide their own
/// implementation that doesn't spawn real processes.
pub trait ProcessBackend: Send {
    /// Start one process instance. Outcome is reported through
    /// `RuntimeEvent`s (`ProcessStarted`, `SpawnFailed`, `ProcessExited`).
    fn launch(
        &mut self,
        request: LaunchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Forcefully terminate the process trees of `names`.
    fn terminate_trees(
        &mut self,
        names: Vec<ProcessName>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Real backend used in production: runs OS processes locally.
pub struct LocalProcessBackend {
    tx: mpsc::Sender<ExecutorCommand>,
}

impl LocalProcessBackend {
    /// Create a backend wired to the given runtime event sender, using the
    /// platform tree killer.
    ///
    /// This spawns the background executor loop immediately.
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, options: ExecutorOptions) -> Self {
        Self::with_killer(runtime_tx, options, Arc::new(SystemTreeKiller))
    }

    pub fn with_killer(
        runtime_tx: mpsc::Sender<RuntimeEvent>,
        options: ExecutorOptions,
        killer: Arc<dyn TreeKiller>,
    ) -> Self {
        let tx = spawn_executor(runtime_tx, options, killer);
        Self { tx }
    }

    fn forward(
        &self,
        command: ExecutorCommand,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'static>> {
        // Clone the sender so the future doesn't borrow `self` across `await`.
        let tx = self.tx.clone();
        Box::pin(async move {
            tx.send(command).await.map_err(Error::from)?;
            Ok(())
        })
    }
}

impl ProcessBackend for LocalProcessBackend {
    fn launch(
        &mut self,
        request: LaunchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        self.forward(ExecutorCommand::Launch(request))
    }

    fn terminate_trees(
        &mut self,
        names: Vec<ProcessName>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        self.forward(ExecutorCommand::Terminate(names))
    }
}
