// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::ProcessBackend;

use super::core::Supervisor;
use super::{CoreCommand, RuntimeEvent};

/// Drives the [`Supervisor`] in response to `RuntimeEvent`s and delegates
/// starting and killing processes to a `ProcessBackend`.
///
/// This is a pure IO shell around the supervisor, which contains all the
/// restart semantics. Events are handled one at a time, each to completion
/// (including its commands) before the next is read.
pub struct Runtime<B: ProcessBackend> {
    core: Supervisor,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    backend: B,
}

impl<B: ProcessBackend> fmt::Debug for Runtime<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<B: ProcessBackend> Runtime<B> {
    pub fn new(core: Supervisor, event_rx: mpsc::Receiver<RuntimeEvent>, backend: B) -> Self {
        Self {
            core,
            event_rx,
            backend,
        }
    }

    /// Main event loop.
    ///
    /// - Launches every entry.
    /// - Consumes `RuntimeEvent`s from `event_rx` and feeds them to the core.
    /// - Executes commands returned by the core (launch, terminate, exit).
    ///
    /// Returns the final supervisor so callers can inspect the outcome.
    pub async fn run(mut self) -> Result<Supervisor> {
        info!(processes = self.core.entries().len(), "squidrun runtime started");

        let step = self.core.start();
        for command in step.commands {
            self.execute_command(command).await?;
        }

        if step.keep_running {
            loop {
                let event = match self.event_rx.recv().await {
                    Some(e) => e,
                    None => {
                        info!("runtime event channel closed; exiting");
                        break;
                    }
                };

                debug!(?event, "runtime received event");

                let step = self.core.step(event);

                for command in step.commands {
                    self.execute_command(command).await?;
                }

                if !step.keep_running {
                    info!("core requested exit; stopping runtime");
                    break;
                }
            }
        }

        if let Some(origin) = self.core.cascade_origin() {
            info!(process = %origin, "run ended after retry budget was exhausted");
        }
        info!("runtime exiting");
        Ok(self.core)
    }

    /// Execute a single command from the core.
    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::Launch(request) => {
                debug!(process = %request.name(), attempt = request.attempt, "dispatching launch");
                self.backend.launch(request).await?;
            }
            CoreCommand::TerminateTrees(names) => {
                debug!(?names, "dispatching termination");
                self.backend.terminate_trees(names).await?;
            }
            CoreCommand::RequestExit => {
                // The core already returns keep_running=false alongside this
                // command; nothing else to do here.
                debug!("core issued RequestExit command");
            }
        }
        Ok(())
    }
}
