// src/expr/parser.rs

//! Parser for dotted identifier paths.

use thiserror::Error;

use super::ast::Expression;

/// Malformed expression text.
///
/// `position` is the character offset in the expression text where the
/// problem was detected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at position {position}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// Longest accepted member chain, counted in identifiers.
///
/// Evaluation walks the chain recursively, so deeper paths are rejected at
/// parse time instead.
pub const MAX_PATH_DEPTH: usize = 128;

/// Parse expression text such as `secrets.NAME` into an [`Expression`].
///
/// `a.b.c` becomes `MemberAccess(a, MemberAccess(b, c))`, so evaluation
/// resolves `a` first, then `b` inside it, then `c` inside that.
pub fn parse(text: &str) -> Result<Expression, ParseError> {
    let chars: Vec<char> = text.chars().collect();
    let mut parser = Parser { chars, pos: 0 };
    let path = parser.parse_path()?;
    Ok(fold_path(path))
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    /// `identifier ('.' identifier)*`, spaces allowed between tokens.
    fn parse_path(&mut self) -> Result<Vec<String>, ParseError> {
        let mut path = Vec::new();

        loop {
            self.skip_whitespace();

            let start = self.pos;
            match self.peek() {
                None => return Err(ParseError::new("unexpected end of input", self.pos)),
                Some('.') => return Err(ParseError::new("unexpected '.'", self.pos)),
                Some(c) => match self.identifier() {
                    Some(name) if path.len() < MAX_PATH_DEPTH => path.push(name),
                    Some(_) => {
                        return Err(ParseError::new("expression too deeply nested", start));
                    }
                    None => {
                        return Err(ParseError::new(
                            format!("unexpected character '{c}'"),
                            self.pos,
                        ));
                    }
                },
            }

            self.skip_whitespace();

            match self.peek() {
                None => return Ok(path),
                Some('.') => self.pos += 1,
                Some(c) if is_identifier_start(c) => {
                    return Err(ParseError::new("unexpected identifier", self.pos));
                }
                Some(c) => {
                    return Err(ParseError::new(
                        format!("unexpected character '{c}'"),
                        self.pos,
                    ));
                }
            }
        }
    }

    /// Greedily scan `[A-Za-z_$][A-Za-z0-9_$]*`.
    fn identifier(&mut self) -> Option<String> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            let accepted = if self.pos == start {
                is_identifier_start(c)
            } else {
                is_identifier_continue(c)
            };
            if !accepted {
                break;
            }
            self.pos += 1;
        }

        (self.pos > start).then(|| self.chars[start..self.pos].iter().collect())
    }

    /// Only spaces separate tokens; tabs and newlines are bad characters.
    fn skip_whitespace(&mut self) {
        while self.peek() == Some(' ') {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_continue(c: char) -> bool {
    is_identifier_start(c) || c.is_ascii_digit()
}

/// Nest a non-empty path to the right: `[a, b, c]` → `a.(b.c)`.
fn fold_path(mut path: Vec<String>) -> Expression {
    let last = path.pop().unwrap_or_default();
    path.into_iter()
        .rev()
        .fold(Expression::Identifier(last), |member, name| {
            Expression::member(Expression::Identifier(name), member)
        })
}
