use insta::assert_snapshot;
use taxi_common::error::LexErrorKind;
use taxi_common::token::TokenKind;
use taxi_lexer::Lexer;

/// One line per token: `Kind text start..end`.
fn dump(source: &str) -> String {
    Lexer::tokenize(source)
        .into_iter()
        .map(|tok| {
            let text = &source[tok.span.start as usize..tok.span.end as usize];
            format!("{:?} {:?} {}..{}", tok.kind, text, tok.span.start, tok.span.end)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Declarations ───────────────────────────────────────────────────────

#[test]
fn test_field_with_array_and_nullable() {
    assert_snapshot!(dump("tags : Tag[]?"), @r#"
    Ident "tags" 0..4
    Colon ":" 5..6
    Ident "Tag" 7..10
    LBracket "[" 10..11
    RBracket "]" 11..12
    Question "?" 12..13
    Eof "" 13..13
    "#);
}

#[test]
fn test_annotation_with_literals() {
    assert_snapshot!(dump("@Http(path = '/p', retries = -3, ratio = 0.5)"), @r#"
    At "@" 0..1
    Ident "Http" 1..5
    LParen "(" 5..6
    Ident "path" 6..10
    Eq "=" 11..12
    StringLiteral "'/p'" 13..17
    Comma "," 17..18
    Ident "retries" 19..26
    Eq "=" 27..28
    IntLiteral "-3" 29..31
    Comma "," 31..32
    Ident "ratio" 33..38
    Eq "=" 39..40
    DecimalLiteral "0.5" 41..44
    RParen ")" 44..45
    Eof "" 45..45
    "#);
}

#[test]
fn test_lambda_and_union_punctuation() {
    let kinds: Vec<_> = Lexer::tokenize("(A) -> B | C")
        .into_iter()
        .map(|t| t.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::LParen,
            TokenKind::Ident,
            TokenKind::RParen,
            TokenKind::Arrow,
            TokenKind::Ident,
            TokenKind::Bar,
            TokenKind::Ident,
            TokenKind::Eof,
        ]
    );
}

// ── Comments ───────────────────────────────────────────────────────────

#[test]
fn test_doc_and_plain_comments() {
    let source = "[[ A person ]]\n// note\n/* block\n comment */ type";
    let kinds: Vec<_> = Lexer::tokenize(source).into_iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::DocComment,
            TokenKind::Comment,
            TokenKind::Comment,
            TokenKind::Type,
            TokenKind::Eof,
        ]
    );
}

// ── Errors ─────────────────────────────────────────────────────────────

#[test]
fn test_unexpected_character_is_recorded_and_lexing_continues() {
    let (tokens, errors) = Lexer::tokenize_with_errors("type # Foo");
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind.clone()).collect();
    assert_eq!(
        kinds,
        vec![TokenKind::Type, TokenKind::Error, TokenKind::Ident, TokenKind::Eof]
    );
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, LexErrorKind::UnexpectedCharacter('#'));
    assert_eq!((errors[0].span.start, errors[0].span.end), (5, 6));
}

#[test]
fn test_unterminated_string() {
    let (_, errors) = Lexer::tokenize_with_errors("x = 'abc");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, LexErrorKind::UnterminatedString);
}

#[test]
fn test_unterminated_doc_comment() {
    let (tokens, errors) = Lexer::tokenize_with_errors("[[ never closed");
    assert_eq!(tokens[0].kind, TokenKind::Error);
    assert_eq!(errors[0].kind, LexErrorKind::UnterminatedDocComment);
}
