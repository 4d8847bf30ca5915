// src/output/palette.rs

use std::fmt;

const RESET: &str = "\u{1b}[0m";

/// Label colors, cycled in process start order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
}

pub const PALETTE: [Color; 5] = [
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
];

impl Color {
    /// Color for the `index`-th started process.
    pub fn for_index(index: usize) -> Color {
        PALETTE[index % PALETTE.len()]
    }

    fn ansi_code(self) -> &'static str {
        match self {
            Color::Green => "32",
            Color::Yellow => "33",
            Color::Blue => "34",
            Color::Magenta => "35",
            Color::Cyan => "36",
        }
    }
}

/// Colored `[name]` prefix written in front of every output line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    name: String,
    color: Color,
}

impl Label {
    pub fn new(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> Color {
        self.color
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\u{1b}[{}m[{}]{}", self.color.ansi_code(), self.name, RESET)
    }
}
