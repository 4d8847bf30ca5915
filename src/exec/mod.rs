// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the processes the
//! supervisor launches, using `tokio::process::Command`, and reporting back
//! to the runtime via `RuntimeEvent`s.
//!
//! - [`executor_loop`] owns the main executor loop and the running OS
//!   processes, at most one per process name.
//! - [`process_runner`] builds, spawns and waits on individual processes and
//!   feeds their output into the multiplexer.
//! - [`tree`] terminates a process together with everything it spawned.
//! - [`backend`] provides the `ProcessBackend` trait and the concrete
//!   `LocalProcessBackend` that the runtime uses in production, and which
//!   tests can replace with a fake implementation.

pub mod backend;
pub mod executor_loop;
pub mod process_runner;
pub mod tree;

pub use backend::{LocalProcessBackend, ProcessBackend};
pub use executor_loop::{ExecutorCommand, ExecutorOptions, spawn_executor};
pub use tree::{SystemTreeKiller, TreeKiller};
