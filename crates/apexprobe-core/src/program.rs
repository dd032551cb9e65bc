//! Program assembly
//!
//! Generators append lines to a [`ProgramBuilder`] and hand back an
//! immutable [`GeneratedProgram`]. Lines can only be added at the end, so a
//! generator cannot reorder or drop the safety moves it already emitted.
//! The `%`/`O` header and termination footer are added by [`ProgramWrap`].

use crate::codes::{M30, M99, PERCENT};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Append-only line buffer.
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    lines: Vec<String>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line.
    pub fn line(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    /// Append an empty separator line.
    pub fn blank(&mut self) -> &mut Self {
        self.line(String::new())
    }

    /// Append several lines in order.
    pub fn lines<I, S>(&mut self, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
        self
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn finish(self) -> GeneratedProgram {
        GeneratedProgram { lines: self.lines }
    }
}

/// An ordered, immutable sequence of NC lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GeneratedProgram {
    lines: Vec<String>,
}

impl GeneratedProgram {
    /// A program with no lines, returned when a precondition is not met.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// Apply the header and footer if `wrap` is enabled.
    pub fn wrapped(self, wrap: &ProgramWrap, title: &str) -> Self {
        if !wrap.enabled {
            return self;
        }
        let mut builder = ProgramBuilder::new();
        builder
            .line(PERCENT)
            .line(wrap.header_line(title))
            .lines(self.lines)
            .line(wrap.termination.code())
            .line(PERCENT);
        builder.finish()
    }
}

impl fmt::Display for GeneratedProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

impl IntoIterator for GeneratedProgram {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.into_iter()
    }
}

impl<'a> IntoIterator for &'a GeneratedProgram {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

/// How a wrapped program ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// `M30`, end of main program
    #[default]
    ProgramEnd,
    /// `M99`, return from sub-program
    SubprogramReturn,
}

impl Termination {
    pub fn code(self) -> &'static str {
        match self {
            Self::ProgramEnd => M30,
            Self::SubprogramReturn => M99,
        }
    }

    pub fn from_return_flag(use_return_code: bool) -> Self {
        if use_return_code {
            Self::SubprogramReturn
        } else {
            Self::ProgramEnd
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Program header/footer options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramWrap {
    /// Emit `%`, the O-number line and the termination code.
    pub enabled: bool,
    /// Program number, with or without a leading `O`.
    pub program_number: String,
    pub termination: Termination,
}

impl Default for ProgramWrap {
    fn default() -> Self {
        Self {
            enabled: false,
            program_number: "1234".to_string(),
            termination: Termination::ProgramEnd,
        }
    }
}

impl ProgramWrap {
    /// Wrapping disabled.
    pub fn none() -> Self {
        Self::default()
    }

    /// Wrapping enabled with the given program number and termination.
    pub fn program(program_number: impl Into<String>, termination: Termination) -> Self {
        Self {
            enabled: true,
            program_number: program_number.into(),
            termination,
        }
    }

    /// Program number without the leading `O`.
    pub fn cleaned_number(&self) -> String {
        let upper = self.program_number.trim().to_uppercase();
        upper
            .strip_prefix('O')
            .unwrap_or(&upper)
            .trim()
            .to_string()
    }

    pub fn header_line(&self, title: &str) -> String {
        format!("O{} ({title})", self.cleaned_number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_preserves_order_and_blanks() {
        let mut builder = ProgramBuilder::new();
        builder.blank().line("G00 Z1.").lines(["A", "B"]);
        assert_eq!(builder.len(), 4);
        let program = builder.finish();
        assert_eq!(program.lines(), ["", "G00 Z1.", "A", "B"]);
        assert_eq!(program.to_string(), "\nG00 Z1.\nA\nB");
    }

    #[test]
    fn test_wrap_disabled_is_identity() {
        let mut builder = ProgramBuilder::new();
        builder.line("M01");
        let program = builder.finish();
        assert_eq!(program.clone().wrapped(&ProgramWrap::none(), "X"), program);
    }

    #[test]
    fn test_wrap_enabled() {
        let mut builder = ProgramBuilder::new();
        builder.line("BODY");
        let program = builder
            .finish()
            .wrapped(&ProgramWrap::program("o77", Termination::SubprogramReturn), "T");
        assert_eq!(program.lines(), ["%", "O77 (T)", "BODY", "M99", "%"]);
    }

    #[test]
    fn test_cleaned_number() {
        let wrap = ProgramWrap::program(" O1001 ", Termination::ProgramEnd);
        assert_eq!(wrap.cleaned_number(), "1001");
        assert_eq!(Termination::from_return_flag(false).code(), "M30");
    }
}
