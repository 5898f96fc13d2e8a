use serde::Serialize;

use crate::span::Span;

/// A token produced by the Taxi lexer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, start: u32, end: u32) -> Self {
        Self {
            kind,
            span: Span::new(start, end),
        }
    }
}

/// Every kind of token in the Taxi schema language.
///
/// Contextual words such as `from` (return-value derivation) are lexed as
/// plain identifiers and recognized by the parser from their text, so they
/// remain usable as field and parameter names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    // ── Keywords (15) ──────────────────────────────────────────────────
    Alias,
    Annotation,
    As,
    By,
    Closed,
    Enum,
    Extension,
    False,
    Inherits,
    Namespace,
    Operation,
    Parameter,
    Service,
    True,
    Type,

    // ── Delimiters (6) ─────────────────────────────────────────────────
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,

    // ── Punctuation (10) ───────────────────────────────────────────────
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `:`
    Colon,
    /// `?`
    Question,
    /// `=`
    Eq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `|` separating union members
    Bar,
    /// `@` introducing an annotation
    At,
    /// `->` in lambda types
    Arrow,

    // ── Literals (3) ───────────────────────────────────────────────────
    /// Quoted string, single or double quotes. The span includes the quotes.
    StringLiteral,
    /// Integer literal, e.g. `42` or `-7`.
    IntLiteral,
    /// Decimal literal, e.g. `3.14`.
    DecimalLiteral,

    // ── Identifiers and comments (3) ───────────────────────────────────
    Ident,
    /// `//` line comment or `/* */` block comment.
    Comment,
    /// `[[ ... ]]` documentation attached to the following declaration.
    DocComment,

    // ── Special (2) ────────────────────────────────────────────────────
    Eof,
    /// Invalid input. The lexer records a matching `LexError`.
    Error,
}

/// Look up a keyword from its text. Keywords are case-sensitive.
pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
    let kind = match s {
        "alias" => TokenKind::Alias,
        "annotation" => TokenKind::Annotation,
        "as" => TokenKind::As,
        "by" => TokenKind::By,
        "closed" => TokenKind::Closed,
        "enum" => TokenKind::Enum,
        "extension" => TokenKind::Extension,
        "false" => TokenKind::False,
        "inherits" => TokenKind::Inherits,
        "namespace" => TokenKind::Namespace,
        "operation" => TokenKind::Operation,
        "parameter" => TokenKind::Parameter,
        "service" => TokenKind::Service,
        "true" => TokenKind::True,
        "type" => TokenKind::Type,
        _ => return None,
    };
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_every_keyword() {
        let keywords = [
            ("alias", TokenKind::Alias),
            ("annotation", TokenKind::Annotation),
            ("as", TokenKind::As),
            ("by", TokenKind::By),
            ("closed", TokenKind::Closed),
            ("enum", TokenKind::Enum),
            ("extension", TokenKind::Extension),
            ("false", TokenKind::False),
            ("inherits", TokenKind::Inherits),
            ("namespace", TokenKind::Namespace),
            ("operation", TokenKind::Operation),
            ("parameter", TokenKind::Parameter),
            ("service", TokenKind::Service),
            ("true", TokenKind::True),
            ("type", TokenKind::Type),
        ];
        for (text, expected) in keywords {
            assert_eq!(keyword_from_str(text), Some(expected), "keyword {text:?}");
        }
    }

    #[test]
    fn contextual_words_are_not_keywords() {
        assert_eq!(keyword_from_str("from"), None);
        assert_eq!(keyword_from_str("import"), None);
        assert_eq!(keyword_from_str("Type"), None);
        assert_eq!(keyword_from_str(""), None);
    }
}
