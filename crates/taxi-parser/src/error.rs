//! Parse errors.

use std::fmt;

use taxi_common::error::LexError;
use taxi_common::span::Span;

/// A parse error with its primary span and an optional related span, for
/// example where an unclosed brace was opened.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
    pub related: Option<(String, Span)>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            related: None,
        }
    }

    pub fn with_related(
        message: impl Into<String>,
        span: Span,
        related_message: impl Into<String>,
        related_span: Span,
    ) -> Self {
        Self {
            message: message.into(),
            span,
            related: Some((related_message.into(), related_span)),
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::new(err.kind.to_string(), err.span)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;
    use taxi_common::error::LexErrorKind;

    #[test]
    fn parse_error_with_related() {
        let err = ParseError::with_related(
            "expected `}` to close type body",
            Span::new(40, 40),
            "body opened here",
            Span::new(9, 10),
        );
        assert_eq!(err.to_string(), "expected `}` to close type body");
        assert_eq!(err.related, Some(("body opened here".to_string(), Span::new(9, 10))));
    }

    #[test]
    fn lex_errors_become_parse_errors() {
        let err: ParseError =
            LexError::new(LexErrorKind::UnterminatedString, Span::new(2, 6)).into();
        assert_eq!(err.message, "unterminated string literal");
        assert_eq!(err.span, Span::new(2, 6));
    }
}
