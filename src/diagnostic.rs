//! Parse diagnostics and the strict-mode error type.

use crate::span::{Span, offset_to_line_col};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A declaration was skipped; the rest of the block was still parsed.
    Warning,
    /// A whole block was lost.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticKind {
    UnexpectedCharacter,
    UnterminatedString,
    MalformedField,
    MalformedBlock,
    UnclosedBlock,
    UnexpectedToken,
    DuplicateField,
    ScalarRelation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Span,
    /// 1-based.
    pub line: usize,
    /// 1-based, in characters.
    pub column: usize,
}

impl Diagnostic {
    pub fn new(
        source: &str,
        severity: Severity,
        kind: DiagnosticKind,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        let (line, column) = offset_to_line_col(source, span.start);
        Self {
            severity,
            kind,
            message: message.into(),
            span,
            line,
            column,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Format the diagnostic with the offending source line and a caret.
    pub fn format_with_source(&self, source: &str) -> String {
        let label = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        let mut out = format!("{}: {}\n", label, self.message);
        out.push_str(&format!("  --> line {}:{}\n", self.line, self.column));

        if let Some(source_line) = source.lines().nth(self.line.saturating_sub(1)) {
            out.push_str(&format!("   |\n{:3}| {}\n   | ", self.line, source_line));
            for _ in 1..self.column {
                out.push(' ');
            }
            out.push('^');

            let remaining = source_line.chars().count().saturating_sub(self.column);
            let underline = self.span.width().saturating_sub(1).min(remaining);
            for _ in 0..underline {
                out.push('~');
            }
            out.push('\n');
        }

        out
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

/// Raised by strict parsing on the first error-severity diagnostic.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Rejected schema at {0}")]
    Rejected(Diagnostic),
}

impl ParseError {
    pub fn diagnostic(&self) -> &Diagnostic {
        match self {
            ParseError::Rejected(d) => d,
        }
    }

    pub fn format_with_source(&self, source: &str) -> String {
        self.diagnostic().format_with_source(source)
    }
}
