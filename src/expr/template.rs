// src/expr/template.rs

//! `${{ ... }}` template splitting and rendering.
//!
//! Parsing is fail-open: an expression that does not parse is kept as
//! literal text (including its `${{ }}` delimiters) and the failure is
//! reported next to the result instead of aborting.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::ast::Expression;
use super::parser::{ParseError, parse};

static EXPR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{\{[^}]*\}\}").expect("expression delimiter pattern is valid")
});

/// One piece of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSegment {
    Literal(String),
    Expression(Expression),
}

/// An expression segment that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateError {
    /// The raw segment text, delimiters included.
    pub segment: String,
    pub error: ParseError,
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} in {:?}", self.error, self.segment)
    }
}

/// A parsed template value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Template {
    segments: Vec<TemplateSegment>,
}

impl Template {
    /// Split `raw` into literal and expression segments.
    ///
    /// Returns the template together with every parse failure encountered.
    pub fn parse(raw: &str) -> (Template, Vec<TemplateError>) {
        let mut segments = Vec::new();
        let mut errors = Vec::new();
        let mut last = 0;

        for m in EXPR_PATTERN.find_iter(raw) {
            if m.start() > last {
                segments.push(TemplateSegment::Literal(raw[last..m.start()].to_string()));
            }

            let segment = m.as_str();
            let inner = segment[3..segment.len() - 2].trim();
            match parse(inner) {
                Ok(expr) => segments.push(TemplateSegment::Expression(expr)),
                Err(error) => {
                    errors.push(TemplateError {
                        segment: segment.to_string(),
                        error,
                    });
                    segments.push(TemplateSegment::Literal(segment.to_string()));
                }
            }

            last = m.end();
        }

        if last < raw.len() {
            segments.push(TemplateSegment::Literal(raw[last..].to_string()));
        }

        (Template { segments }, errors)
    }

    pub fn segments(&self) -> &[TemplateSegment] {
        &self.segments
    }

    /// Concatenate all segments, evaluating expressions against `context`.
    pub fn render(&self, context: &Value) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                TemplateSegment::Literal(text) => out.push_str(text),
                TemplateSegment::Expression(expr) => out.push_str(&expr.render(context)),
            }
        }
        out
    }
}

/// Result of substituting one raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub value: String,
    pub errors: Vec<TemplateError>,
}

/// Parse and render `raw` in one go.
pub fn substitute(raw: &str, context: &Value) -> Substitution {
    let (template, errors) = Template::parse(raw);
    Substitution {
        value: template.render(context),
        errors,
    }
}
