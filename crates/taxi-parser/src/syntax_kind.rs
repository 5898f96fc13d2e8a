//! SyntaxKind enum for the Taxi CST.
//!
//! Token kinds are mapped 1:1 from [`TokenKind`] (in SCREAMING_SNAKE_CASE),
//! followed by the composite node kinds produced by the parser.

use taxi_common::token::TokenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // ── Sentinels ──────────────────────────────────────────────────────
    /// Placeholder for an opened node whose kind is not known yet.
    TOMBSTONE = 0,
    /// Wraps tokens that could not be parsed.
    ERROR_NODE = 1,

    // ── Keywords ───────────────────────────────────────────────────────
    ALIAS_KW,
    ANNOTATION_KW,
    AS_KW,
    BY_KW,
    CLOSED_KW,
    ENUM_KW,
    EXTENSION_KW,
    FALSE_KW,
    INHERITS_KW,
    NAMESPACE_KW,
    OPERATION_KW,
    PARAMETER_KW,
    SERVICE_KW,
    TRUE_KW,
    TYPE_KW,

    // ── Delimiters and punctuation ─────────────────────────────────────
    L_PAREN,
    R_PAREN,
    L_BRACKET,
    R_BRACKET,
    L_BRACE,
    R_BRACE,
    COMMA,
    DOT,
    COLON,
    QUESTION,
    EQ,
    LT,
    GT,
    BAR,
    AT,
    ARROW,

    // ── Literals, identifiers, comments ────────────────────────────────
    STRING_LITERAL,
    INT_LITERAL,
    DECIMAL_LITERAL,
    IDENT,
    COMMENT,
    DOC_COMMENT,
    EOF,
    ERROR,

    // ── Top level ──────────────────────────────────────────────────────
    SOURCE_FILE,
    /// `namespace a.b { ... }` or `namespace a.b` applying to the rest of the file.
    NAMESPACE_DECL,
    /// Braced item list of a block namespace.
    NAMESPACE_BODY,

    // ── Declarations ───────────────────────────────────────────────────
    /// `type Name<T> inherits A, B { fields }`
    TYPE_DECL,
    /// `type Name = A | B`
    UNION_DECL,
    /// `enum Name inherits Base { A, B }`
    ENUM_DECL,
    /// `type alias Name as Type`
    TYPE_ALIAS_DECL,
    /// `annotation Name { fields }`
    ANNOTATION_DECL,
    /// `type extension Name { ... }`
    TYPE_EXTENSION,
    /// `enum extension Name { ... }`
    ENUM_EXTENSION,
    /// `type alias extension Name`
    TYPE_ALIAS_EXTENSION,
    /// `service Name { operations }`
    SERVICE_DECL,

    // ── Declaration parts ──────────────────────────────────────────────
    /// Declared name, possibly dotted: `com.acme.Person`.
    NAME,
    /// `<T, U>` on a generic type declaration.
    TYPE_PARAM_LIST,
    TYPE_PARAM,
    /// `inherits A, B`
    INHERITS_CLAUSE,
    /// `{ field* }`
    TYPE_BODY,
    FIELD,
    /// `as String` after a field type, declaring an inline alias.
    INLINE_ALIAS,
    /// `by xpath("/a")` or `by { ... }`
    ACCESSOR,
    /// `{ name by xpath("/a") }` inside a destructured accessor.
    DESTRUCTURED_ACCESSOR,
    ACCESSOR_FIELD,
    /// `= 'literal'` after a field type.
    DEFAULT_VALUE,
    /// `[[doc]] @Ann NAME('value') synonym of Other.NAME`
    ENUM_VALUE,
    /// `synonym of A.X` or `synonym of [A.X, B.Y]` on an enum value.
    ENUM_SYNONYMS,
    /// Member list of a union declaration.
    UNION_MEMBERS,
    /// `name` or `name : RefinedType` inside a type extension.
    FIELD_EXTENSION,
    OPERATION,
    PARAM_LIST,
    PARAM,
    /// `: Type(constraints)` of an operation.
    RETURN_TYPE,

    // ── Types ──────────────────────────────────────────────────────────
    /// Named type reference with optional arguments, array suffixes and `?`.
    TYPE_REF,
    /// `<A, B>` on a type reference.
    TYPE_ARG_LIST,
    /// `(A, B) -> C`
    LAMBDA_TYPE,
    /// Dotted path: a type name in a reference, or an attribute path.
    PATH,

    // ── Annotations, literals, constraints ─────────────────────────────
    /// `@Name(args)`
    ANNOTATION,
    ANNOTATION_ARG_LIST,
    /// `name = literal`
    ANNOTATION_ARG,
    LITERAL,
    /// `( constraint, ... )` after a type.
    CONSTRAINT_LIST,
    /// `field = 'x'`, `field = param.path`, or `from param.path`.
    CONSTRAINT,
}

impl SyntaxKind {
    /// Tokens skipped by parser lookahead. Error tokens are trivia because the
    /// lexer has already reported them.
    pub fn is_trivia(self) -> bool {
        matches!(self, SyntaxKind::COMMENT | SyntaxKind::ERROR)
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            SyntaxKind::STRING_LITERAL
                | SyntaxKind::INT_LITERAL
                | SyntaxKind::DECIMAL_LITERAL
                | SyntaxKind::TRUE_KW
                | SyntaxKind::FALSE_KW
        )
    }
}

impl From<TokenKind> for SyntaxKind {
    fn from(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Alias => SyntaxKind::ALIAS_KW,
            TokenKind::Annotation => SyntaxKind::ANNOTATION_KW,
            TokenKind::As => SyntaxKind::AS_KW,
            TokenKind::By => SyntaxKind::BY_KW,
            TokenKind::Closed => SyntaxKind::CLOSED_KW,
            TokenKind::Enum => SyntaxKind::ENUM_KW,
            TokenKind::Extension => SyntaxKind::EXTENSION_KW,
            TokenKind::False => SyntaxKind::FALSE_KW,
            TokenKind::Inherits => SyntaxKind::INHERITS_KW,
            TokenKind::Namespace => SyntaxKind::NAMESPACE_KW,
            TokenKind::Operation => SyntaxKind::OPERATION_KW,
            TokenKind::Parameter => SyntaxKind::PARAMETER_KW,
            TokenKind::Service => SyntaxKind::SERVICE_KW,
            TokenKind::True => SyntaxKind::TRUE_KW,
            TokenKind::Type => SyntaxKind::TYPE_KW,

            TokenKind::LParen => SyntaxKind::L_PAREN,
            TokenKind::RParen => SyntaxKind::R_PAREN,
            TokenKind::LBracket => SyntaxKind::L_BRACKET,
            TokenKind::RBracket => SyntaxKind::R_BRACKET,
            TokenKind::LBrace => SyntaxKind::L_BRACE,
            TokenKind::RBrace => SyntaxKind::R_BRACE,
            TokenKind::Comma => SyntaxKind::COMMA,
            TokenKind::Dot => SyntaxKind::DOT,
            TokenKind::Colon => SyntaxKind::COLON,
            TokenKind::Question => SyntaxKind::QUESTION,
            TokenKind::Eq => SyntaxKind::EQ,
            TokenKind::Lt => SyntaxKind::LT,
            TokenKind::Gt => SyntaxKind::GT,
            TokenKind::Bar => SyntaxKind::BAR,
            TokenKind::At => SyntaxKind::AT,
            TokenKind::Arrow => SyntaxKind::ARROW,

            TokenKind::StringLiteral => SyntaxKind::STRING_LITERAL,
            TokenKind::IntLiteral => SyntaxKind::INT_LITERAL,
            TokenKind::DecimalLiteral => SyntaxKind::DECIMAL_LITERAL,
            TokenKind::Ident => SyntaxKind::IDENT,
            TokenKind::Comment => SyntaxKind::COMMENT,
            TokenKind::DocComment => SyntaxKind::DOC_COMMENT,
            TokenKind::Eof => SyntaxKind::EOF,
            TokenKind::Error => SyntaxKind::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_come_first() {
        assert_eq!(SyntaxKind::TOMBSTONE as u16, 0);
        assert_eq!(SyntaxKind::ERROR_NODE as u16, 1);
    }

    #[test]
    fn trivia_and_literals() {
        assert!(SyntaxKind::COMMENT.is_trivia());
        assert!(SyntaxKind::ERROR.is_trivia());
        assert!(!SyntaxKind::DOC_COMMENT.is_trivia());
        assert!(SyntaxKind::TRUE_KW.is_literal());
        assert!(!SyntaxKind::IDENT.is_literal());
    }

    #[test]
    fn token_kinds_map_to_matching_syntax_kinds() {
        assert_eq!(SyntaxKind::from(TokenKind::Type), SyntaxKind::TYPE_KW);
        assert_eq!(SyntaxKind::from(TokenKind::Arrow), SyntaxKind::ARROW);
        assert_eq!(SyntaxKind::from(TokenKind::DocComment), SyntaxKind::DOC_COMMENT);
    }
}
