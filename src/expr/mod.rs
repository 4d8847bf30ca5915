// src/expr/mod.rs

//! Template expression language used in manifest environment values.
//!
//! The grammar is deliberately tiny: dotted identifier paths such as
//! `secrets.DB_URL`. There are no literals, operators or calls.
//!
//! - [`parser`] turns expression text into an [`Expression`].
//! - [`ast`] holds the tree and its evaluator.
//! - [`template`] splits raw values on `${{ ... }}` and renders them.

pub mod ast;
pub mod parser;
pub mod template;

pub use ast::Expression;
pub use parser::{MAX_PATH_DEPTH, ParseError, parse};
pub use template::{Substitution, Template, TemplateError, TemplateSegment, substitute};
