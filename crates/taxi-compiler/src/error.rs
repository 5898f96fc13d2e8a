//! Compilation diagnostics.
//!
//! Errors are accumulated while compiling and surfaced once, either as the
//! list returned by `compile_with_messages` or wrapped in a
//! [`CompilationException`].

use std::fmt;

use serde::Serialize;
use taxi_common::span::{LineIndex, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// What went wrong, independent of where.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileErrorKind {
    #[error("{0}")]
    Syntax(String),
    #[error("Unresolved type: {0}")]
    UnresolvedType(String),
    #[error("Attempt to redefine {kind} {name}")]
    Redefinition { kind: &'static str, name: String },
    #[error("Invalid extension: {0}")]
    InvalidExtension(String),
    #[error("Type {name} expects {expected} type argument(s) but received {actual}")]
    InvalidGenericArity {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("{0}")]
    InvalidConstraint(String),
    #[error("{0}")]
    InvalidDeclaration(String),
    #[error("Internal compiler error: {0}")]
    Internal(String),
}

impl CompileErrorKind {
    /// Stable code shown in rendered and JSON diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            CompileErrorKind::Syntax(_) => "E0001",
            CompileErrorKind::UnresolvedType(_) => "E0002",
            CompileErrorKind::Redefinition { .. } => "E0003",
            CompileErrorKind::InvalidExtension(_) => "E0004",
            CompileErrorKind::InvalidGenericArity { .. } => "E0005",
            CompileErrorKind::InvalidConstraint(_) => "E0006",
            CompileErrorKind::InvalidDeclaration(_) => "E0007",
            CompileErrorKind::Internal(_) => "E0099",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CompileErrorKind::Syntax(_) => "Syntax",
            CompileErrorKind::UnresolvedType(_) => "UnresolvedType",
            CompileErrorKind::Redefinition { .. } => "Redefinition",
            CompileErrorKind::InvalidExtension(_) => "InvalidExtension",
            CompileErrorKind::InvalidGenericArity { .. } => "InvalidGenericArity",
            CompileErrorKind::InvalidConstraint(_) => "InvalidConstraint",
            CompileErrorKind::InvalidDeclaration(_) => "InvalidDeclaration",
            CompileErrorKind::Internal(_) => "Internal",
        }
    }
}

/// A located diagnostic. `line` is 1-based, `char` is the 0-based column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilationError {
    pub line: u32,
    pub char: u32,
    pub message: String,
    pub source_name: String,
    pub severity: Severity,
    #[serde(skip)]
    pub kind: CompileErrorKind,
    pub span: Option<Span>,
}

impl CompilationError {
    pub fn new(kind: CompileErrorKind, severity: Severity, source_name: &str, index: &LineIndex, span: Span) -> Self {
        let (line, col) = index.line_col(span.start);
        Self {
            line,
            char: col - 1,
            message: kind.to_string(),
            source_name: source_name.to_string(),
            severity,
            kind,
            span: Some(span),
        }
    }

    /// A diagnostic with no source position, e.g. an internal failure.
    pub fn unlocated(kind: CompileErrorKind, source_name: &str) -> Self {
        Self {
            line: 0,
            char: 0,
            message: kind.to_string(),
            source_name: source_name.to_string(),
            severity: Severity::Error,
            kind,
            span: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for CompilationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({},{}) {}: {}",
            self.source_name, self.line, self.char, self.severity, self.message
        )
    }
}

/// The aggregate failure of one compilation.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Compilation failed with {} error(s):\n{}", .errors.len(), summarize(.errors))]
pub struct CompilationException {
    pub errors: Vec<CompilationError>,
}

impl CompilationException {
    pub fn new(errors: Vec<CompilationError>) -> Self {
        Self { errors }
    }

    pub fn messages(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.message.as_str()).collect()
    }
}

fn summarize(errors: &[CompilationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_is_one_based_line_zero_based_char() {
        let source = "type A {\n  b : Bar\n}";
        let index = LineIndex::new(source);
        let err = CompilationError::new(
            CompileErrorKind::UnresolvedType("Bar".to_string()),
            Severity::Error,
            "a.taxi",
            &index,
            Span::new(15, 18),
        );
        assert_eq!((err.line, err.char), (2, 6));
        assert_eq!(err.message, "Unresolved type: Bar");
        assert_eq!(err.to_string(), "a.taxi(2,6) error: Unresolved type: Bar");
    }

    #[test]
    fn exception_lists_every_error() {
        let exception = CompilationException::new(vec![
            CompilationError::unlocated(CompileErrorKind::Internal("boom".to_string()), "x.taxi"),
            CompilationError::unlocated(
                CompileErrorKind::Redefinition {
                    kind: "type",
                    name: "A".to_string(),
                },
                "y.taxi",
            ),
        ]);
        let text = exception.to_string();
        assert!(text.starts_with("Compilation failed with 2 error(s):"));
        assert!(text.contains("Internal compiler error: boom"));
        assert!(text.contains("Attempt to redefine type A"));
    }
}
