use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use squidrun::engine::{LaunchRequest, ProcessName, RuntimeEvent, SIGNALED_EXIT_CODE};
use squidrun::errors::Result;
use squidrun::exec::ProcessBackend;
use squidrun::output::Color;

/// How a scripted process behaves when launched.
#[derive(Debug, Clone)]
pub enum Behaviour {
    /// Every launch exits immediately with this code.
    Exit(i32),
    /// Launch `n` exits with the `n`-th code; once exhausted the process
    /// keeps running until terminated.
    Sequence(Vec<i32>),
    /// Runs until terminated, then reports a signal exit.
    RunUntilKilled,
    /// The OS refuses to start it.
    FailSpawn,
}

/// One recorded launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRecord {
    pub name: ProcessName,
    pub attempt: u32,
    pub color: Color,
}

/// Everything the fake backend observed.
#[derive(Debug, Default)]
pub struct Recorded {
    pub launches: Vec<LaunchRecord>,
    pub terminated: Vec<ProcessName>,
}

impl Recorded {
    pub fn launch_count(&self, name: &str) -> usize {
        self.launches.iter().filter(|l| l.name == name).count()
    }

    pub fn launched_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for l in &self.launches {
            if !names.contains(&l.name) {
                names.push(l.name.clone());
            }
        }
        names
    }
}

/// A fake backend that:
/// - records every launch and termination
/// - immediately reports `ProcessStarted` / `ProcessExited` /
///   `SpawnFailed` according to each process's [`Behaviour`]
/// - reports a signal exit for running processes when their tree is
///   terminated.
pub struct ScriptedBackend {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    script: HashMap<ProcessName, Behaviour>,
    pending: HashMap<ProcessName, VecDeque<i32>>,
    running: Vec<ProcessName>,
    recorded: Arc<Mutex<Recorded>>,
}

impl ScriptedBackend {
    /// Processes missing from `script` behave as [`Behaviour::RunUntilKilled`].
    pub fn new(
        runtime_tx: mpsc::Sender<RuntimeEvent>,
        script: &[(&str, Behaviour)],
    ) -> (Self, Arc<Mutex<Recorded>>) {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let backend = Self {
            runtime_tx,
            script: script
                .iter()
                .map(|(name, b)| (name.to_string(), b.clone()))
                .collect(),
            pending: HashMap::new(),
            running: Vec::new(),
            recorded: Arc::clone(&recorded),
        };
        (backend, recorded)
    }

    /// Exit code for the next launch of `name`, or `None` if it keeps running.
    fn next_exit(&mut self, name: &str) -> Option<i32> {
        match self.script.get(name).cloned().unwrap_or(Behaviour::RunUntilKilled) {
            Behaviour::Exit(code) => Some(code),
            Behaviour::Sequence(codes) => self
                .pending
                .entry(name.to_string())
                .or_insert_with(|| codes.into_iter().collect())
                .pop_front(),
            Behaviour::RunUntilKilled | Behaviour::FailSpawn => None,
        }
    }
}

impl ProcessBackend for ScriptedBackend {
    fn launch(
        &mut self,
        request: LaunchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let name = request.name().to_string();
        {
            let mut guard = self.recorded.lock().unwrap();
            guard.launches.push(LaunchRecord {
                name: name.clone(),
                attempt: request.attempt,
                color: request.label.color(),
            });
        }

        let fails = matches!(self.script.get(&name), Some(Behaviour::FailSpawn));
        let exit = if fails { None } else { self.next_exit(&name) };
        if !fails && exit.is_none() {
            self.running.push(name.clone());
        }

        let tx = self.runtime_tx.clone();
        Box::pin(async move {
            if fails {
                tx.send(RuntimeEvent::SpawnFailed {
                    process: name,
                    error: "No such file or directory".to_string(),
                })
                .await
                .map_err(anyhow::Error::from)?;
                return Ok(());
            }

            tx.send(RuntimeEvent::ProcessStarted {
                process: name.clone(),
                pid: Some(4242),
            })
            .await
            .map_err(anyhow::Error::from)?;

            if let Some(code) = exit {
                tx.send(RuntimeEvent::ProcessExited { process: name, code })
                    .await
                    .map_err(anyhow::Error::from)?;
            }
            Ok(())
        })
    }

    fn terminate_trees(
        &mut self,
        names: Vec<ProcessName>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let mut killed = Vec::new();
        {
            let mut guard = self.recorded.lock().unwrap();
            for name in names {
                guard.terminated.push(name.clone());
                if let Some(pos) = self.running.iter().position(|n| *n == name) {
                    self.running.remove(pos);
                    killed.push(name);
                }
            }
        }

        let tx = self.runtime_tx.clone();
        Box::pin(async move {
            for name in killed {
                // The runtime may already be gone after a shutdown.
                let _ = tx
                    .send(RuntimeEvent::ProcessExited {
                        process: name,
                        code: SIGNALED_EXIT_CODE,
                    })
                    .await;
            }
            Ok(())
        })
    }
}
