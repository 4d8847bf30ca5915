// src/output/mod.rs

//! Merged, labelled output of all managed processes.
//!
//! - [`palette`] assigns label colors.
//! - [`multiplexer`] reads child streams line by line and writes them to
//!   one shared sink.

pub mod multiplexer;
pub mod palette;

pub use multiplexer::{OutputSink, attach_stream};
pub use palette::{Color, Label, PALETTE};
